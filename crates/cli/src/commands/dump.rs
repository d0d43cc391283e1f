//! Dump command: render every partition of the persisted stores.
//!
//! This is the explicit replacement for the debug hooks the storefront
//! used to hang off the page: the same data, printed from the device's
//! persisted records.

use lavka_store::AppStores;

/// Print every cart partition with line details and per-partition totals.
#[allow(clippy::print_stdout)]
pub fn cart(stores: &AppStores) {
    let snapshot = stores.cart().dump();
    println!("=== cart (active: {}) ===", snapshot.active_identity);
    if snapshot.partitions.is_empty() {
        println!("  (no partitions)");
    }
    for (identity, lines) in &snapshot.partitions {
        println!("  {identity}: {} line(s)", lines.len());
        for line in lines {
            println!(
                "    {} x{} @ {} = {}",
                line.title,
                line.quantity,
                line.unit_price,
                line.line_total()
            );
        }
    }
}

/// Print every favorites partition.
#[allow(clippy::print_stdout)]
pub fn favorites(stores: &AppStores) {
    let snapshot = stores.favorites().dump();
    println!("=== favorites (active: {}) ===", snapshot.active_identity);
    if snapshot.partitions.is_empty() {
        println!("  (no partitions)");
    }
    for (identity, entries) in &snapshot.partitions {
        println!("  {identity}: {} product(s)", entries.len());
        for entry in entries {
            println!("    {}", entry.0);
        }
    }
}
