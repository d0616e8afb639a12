// ./src/main.rs

use std::sync::Arc;

use anyhow::{Context, Result};

use zync_poc::keygen::{generate_address, generate_signature};
use zync_poc::store::SledStore;
use zync_poc::utils::format::truncate_middle;
use zync_poc::workflows::{
    LedgerViewer, SearchOutcome, SubmissionForm, SubmissionOutcome, SubmissionWorkflow,
    WalletSession,
};
use zync_poc::LedgerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::load().context("failed to load configuration")?;
    zync_poc::logging::init_logger(config.level_filter())?;

    println!("Initializing Zync ledger demo...");
    let store =
        Arc::new(SledStore::open(&config.store_path).context("failed to open record store")?);

    let mut viewer =
        LedgerViewer::attach_with_config(Arc::clone(&store), config.recent_feed_limit, &config)
            .await;
    viewer.poll_feed().await;
    println!("{} records already in the store", viewer.recent().len());

    let session = WalletSession::connected(generate_address());
    let mut workflow = SubmissionWorkflow::with_config(Arc::clone(&store), &config);

    // A public transfer.
    let public = SubmissionForm {
        recipient: generate_address(),
        amount: "2.5".to_string(),
        is_private: false,
        secret: String::new(),
    };
    report("public", workflow.submit(&session, &public).await);

    // A shielded transfer. The secret is fresh per run: replaying an old
    // secret would be caught by the store's nullifier check.
    let secret = generate_signature();
    let shielded = SubmissionForm {
        recipient: generate_address(),
        amount: "1.0".to_string(),
        is_private: true,
        secret: secret.clone(),
    };
    let outcome = workflow.submit(&session, &shielded).await;
    let shielded_signature = match &outcome {
        SubmissionOutcome::Submitted { signature, .. } => Some(signature.clone()),
        _ => None,
    };
    report("shielded", outcome);

    // Two appends happened, so the feed has two fresh snapshots queued;
    // drain to the latest.
    viewer.poll_feed().await;
    viewer.poll_feed().await;
    println!("\nrecent transactions:");
    for record in viewer.recent() {
        let kind = if record.is_private { "PRIVATE" } else { "PUBLIC " };
        println!(
            "  {} {:>8} sig {}",
            kind,
            record.amount,
            truncate_middle(&record.signature, 16, 8)
        );
    }

    if let Some(signature) = shielded_signature {
        println!("\nsearching for the shielded transfer...");
        match viewer.search(&signature).await? {
            SearchOutcome::Found(record) => {
                println!("  found {}", record.id);
                if let Some(commitment) = record.commitment.as_deref() {
                    println!("  commitment {}", truncate_middle(commitment, 20, 6));
                }
                let state = viewer.verify_selected().await;
                println!("  verification: {:?}", state);
            }
            SearchOutcome::NotFound => println!("  not found"),
        }
    }

    Ok(())
}

fn report(label: &str, outcome: SubmissionOutcome) {
    match &outcome {
        SubmissionOutcome::Submitted { id, signature } => {
            println!(
                "{} transfer accepted: id {} sig {}",
                label,
                id,
                truncate_middle(signature, 16, 8)
            );
        }
        _ => println!("{} transfer: {}", label, outcome.status_text()),
    }
}
