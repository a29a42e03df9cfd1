use anyhow::{anyhow, Context, Result};
use billing_drafter::{EthersLedger, Ledger, Settlement, SettlementOutcome};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod lock;
mod report;
mod source;
#[cfg(test)]
mod test_support;

use config::{Cli, Command};
use lock::RunLockFile;
use report::{record, RunSummary};
use source::{JsonFileSource, PaymentStatusSource};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let _lock = RunLockFile::acquire(&cli.lock_file)?;
    let config = cli.settlement_config()?;
    let wallet = cli.signer.wallet()?;
    let rpc_url = cli.rpc_url();
    let ledger = EthersLedger::connect(&rpc_url, wallet)
        .await
        .with_context(|| format!("failed connecting to {rpc_url}"))?
        .with_confirmations(cli.confirmations);
    let settlement = Settlement::new(ledger, config);

    info!(
        network = cli.network.name(),
        billing_contract = %settlement.config().billing_contract,
        signer = %settlement.ledger().signer(),
        "billing drafter starting"
    );

    match &cli.command {
        Command::Billing(args) => {
            let data = JsonFileSource::new(&args.input).billing_data()?;
            let result = settlement.bill(&data).await;
            report(&cli, "billing", RunSummary::billing_outcome(&result));
            let receipt = result.context("billing run failed")?;
            println!("Billed {} accounts in {}", data.due_amounts.len(), receipt.transaction_hash);
        }
        Command::Drafting(args) => {
            let records = JsonFileSource::new(&args.input).payment_statuses().await?;

            let outcome = settlement.run(&records).await;
            report(&cli, "drafting", RunSummary::settlement_outcome(&outcome));
            match outcome {
                SettlementOutcome::Succeeded { accounts, receipt } => {
                    println!("Drafted {} accounts in {}", accounts.len(), receipt.transaction_hash);
                }
                SettlementOutcome::Skipped(reason) => {
                    println!("Nothing drafted ({reason})");
                }
                SettlementOutcome::Failed(err) => {
                    return Err(anyhow!(err).context("drafting run failed"));
                }
            }
        }
    }

    Ok(())
}

fn report(cli: &Cli, command: &str, outcome: serde_json::Value) {
    record(
        cli.report.as_deref(),
        &RunSummary {
            command,
            network: cli.network.name(),
            outcome,
        },
    );
}
