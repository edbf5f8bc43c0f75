use bucketpack::{Item, MemoryStore, Packer, PackerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("bucketpack - Basic Usage Example");
    println!("=================================");

    let config = PackerConfig::builder().view_prefix("demo/").build()?;
    let packer = Packer::new(MemoryStore::new(), config);

    println!("\nStoring a handful of items:");
    for (id, price) in [("apple", 1.50), ("banana", 0.75), ("orange", 2.00), ("grape", 3.25)] {
        let payload = price.to_string().into_bytes();
        let leaf_key = packer.put_item(Item::new(id, payload))?;
        println!("  {id:<8} -> {leaf_key}");
    }

    println!("\nLookups:");
    for id in ["apple", "banana", "grape", "kiwi"] {
        match packer.get_item(id)? {
            Some(item) => println!("  [OK] {id}: {}", String::from_utf8_lossy(item.payload())),
            None => println!("  [NOT FOUND] {id}"),
        }
    }

    println!("\nOverwrite then delete:");
    packer.put_item(Item::new("apple", b"1.75".to_vec()))?;
    println!("  apple -> {}", String::from_utf8_lossy(packer.get_item("apple")?.unwrap().payload()));
    packer.delete_item("apple")?;
    println!("  apple present after delete: {}", packer.get_item("apple")?.is_some());

    println!("\nBackend records written: {}", packer.store().len());
    println!("Basic usage demonstration complete!");
    Ok(())
}
