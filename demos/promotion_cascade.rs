use bucketpack::{Item, MemoryStore, Packer, PackerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("bucketpack - Shard Promotion Walkthrough");
    println!("=========================================");

    let config = PackerConfig::builder()
        .view_prefix("cascade/")
        .bucket_count(4)
        .shard_count(4)
        .bucket_max_size(2048)
        .build()?;
    let packer = Packer::new(MemoryStore::new(), config);

    println!(
        "\nSmall bucket_max_size (2048 bytes, {}-byte promotion threshold) forces promotion quickly.",
        packer.config().promotion_threshold()
    );

    let mut backend_sizes = Vec::new();
    for i in 0..200 {
        packer.put_item(Item::new(format!("item-{i:04}"), vec![0u8; 48]))?;
        if i % 25 == 24 {
            backend_sizes.push((i + 1, packer.store().len()));
        }
    }

    println!("\nBackend record count as items accumulate:");
    for (items_written, records) in &backend_sizes {
        println!("  after {items_written:>4} puts: {records} backend records");
    }

    println!("\nEvery item is still reachable after promotion:");
    let mut missing = 0;
    for i in 0..200 {
        if packer.get_item(&format!("item-{i:04}"))?.is_none() {
            missing += 1;
        }
    }
    println!("  missing items: {missing} (expected 0)");

    Ok(())
}
