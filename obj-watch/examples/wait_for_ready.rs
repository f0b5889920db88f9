use obj_watch::logging::{init_logging, LoggingMode};
use obj_watch::{wait_for, watch, WatchConfig, WatchOutcome};
use std::time::Duration;
use tokio::sync::oneshot;
use watch_target::{Document, Element, ObjectTarget};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    println!("1. Waiting for a property on a shared object...");
    let settings = ObjectTarget::new();
    let writer = settings.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        writer.set("ready", true);
    });

    let config = WatchConfig::new()
        .with_attempts(10)
        .with_delay_millis(100)
        .with_debug(true);

    match wait_for(settings, "ready", config).await? {
        WatchOutcome::Found { detected, context } => {
            println!("✓ ready = {:?} after {} attempts", detected, context.attempts())
        }
        WatchOutcome::Exhausted { context } => {
            println!("✗ gave up after {} attempts", context.attempts())
        }
    }

    println!("\n2. Watching a document for list items...");
    let doc = Document::from_elements(vec![Element::new("ul").with_id("queue")]);
    let writer = doc.clone();
    tokio::spawn(async move {
        for title in ["first", "second"] {
            tokio::time::sleep(Duration::from_millis(150)).await;
            writer.append_to("queue", Element::new("li").with_class("track").with_text(title));
        }
    });

    let (found_tx, found_rx) = oneshot::channel();
    let (failed_tx, failed_rx) = oneshot::channel();

    watch(
        doc,
        "#queue > li.track",
        WatchConfig::new()
            .with_attempts(5)
            .with_delay_millis(100)
            .on_success(move |detected, ctx| {
                let count = detected.as_elements().map(|items| items.len()).unwrap_or(0);
                let _ = found_tx.send((count, ctx.attempts()));
            })
            .on_failure(move |ctx| {
                let _ = failed_tx.send(ctx.attempts());
            }),
    )?;

    tokio::select! {
        Ok((count, attempts)) = found_rx => {
            println!("✓ {} item(s) matched on attempt {}", count, attempts);
        }
        Ok(attempts) = failed_rx => {
            println!("✗ no items after {} attempts", attempts);
        }
        else => println!("✗ watch ended without a result"),
    }

    println!("\n3. Invalid targets are rejected up front...");
    match watch(serde_json::json!(42), "ready", WatchConfig::new()) {
        Ok(()) => println!("✗ scalar target was accepted"),
        Err(e) => println!("✓ {}", e),
    }

    Ok(())
}
