//! Record a few incidents and trades, then print one vehicle's timeline.

use carledger::{Codec, Concurrency, Event, Ledger, MemoryStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Ledger::builder(MemoryStore::new())
        .concurrency(Concurrency::CompareAndSwap)
        .build()?;

    ledger.execute("init", &["0"])?;

    ledger.append_event(
        Event::new("e1", "car1")
            .with_owner("bob")
            .with_day_code("2024-01-01")
            .with_location("51.5072,-0.1276")
            .with_describe("rear-end collision at junction")
            .with_iot_records(["obd:42", "cam:front"]),
    )?;
    println!("Recorded e1 for car1");

    ledger.execute(
        "PutEvent",
        &["e2", "car2", "alice", "2024-01-02", "depot", "", "scratch on door", "cam:side"],
    )?;
    println!("Recorded e2 for car2");

    ledger.execute(
        "append_transaction",
        &["t1", "bob", "alice", "dealer-a", "dealer-b", "10", "12", "2024-01-03T09:00:00Z"],
    )?;
    println!("Recorded trade t1");

    let body = ledger
        .execute("timeline", &["car1"])?
        .unwrap_or_default();
    let events: Vec<Event> = Codec::default().decode(&body)?;

    println!("\nTimeline for car1:");
    for event in &events {
        println!(
            "  [{}] {} ({} IoT devices: {})",
            event.day_code,
            event.describe,
            event.iot_count(),
            event.iot_records().collect::<Vec<_>>().join(", ")
        );
    }

    Ok(())
}
