//! Command-line and environment configuration.

use std::{fs, path::PathBuf};

use alloy_primitives::{address, Address, FixedBytes, U256};
use anyhow::{anyhow, Context, Result};
use billing_drafter::{types::ExecutionAuthority, SettlementConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ethers::signers::LocalWallet;

/// Bill accounts for the period, or draft and fine the ones that did not pay.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Network whose default billing contract and RPC URL are used.
    #[arg(long, env = "NETWORK", value_enum, default_value_t = Network::Testnet, global = true)]
    pub network: Network,

    /// RPC URL (defaults to the network's public endpoint).
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Billing contract address (defaults to the network's deployment).
    #[arg(long, env = "BILLING_CONTRACT_ADDRESS", global = true)]
    pub billing_contract: Option<Address>,

    #[command(flatten)]
    pub signer: SignerArgs,

    /// Path of a JSON run report to create or update.
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Blocks to wait for before a submission counts as mined.
    #[arg(long, env = "CONFIRMATIONS", default_value_t = 1, global = true)]
    pub confirmations: usize,

    /// Advisory lock file; a second concurrent invocation fails fast.
    #[arg(long, default_value = "billing-drafter.lock", global = true)]
    pub lock_file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish the period's dues and fee to the billing contract.
    Billing(BillingArgs),
    /// Draft and fine every unpaid account in one atomic submission.
    Drafting(DraftingArgs),
}

#[derive(Args, Debug)]
pub struct SignerArgs {
    /// Path to a file containing the signer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key", global = true)]
    pub private_key_path: Option<PathBuf>,

    /// Signer private key (hex string, 0x...).
    #[arg(long, env = "PRIVATE_KEY", conflicts_with = "private_key_path", global = true)]
    pub private_key: Option<String>,
}

impl SignerArgs {
    pub fn wallet(&self) -> Result<LocalWallet> {
        let key = if let Some(ref path) = self.private_key_path {
            fs::read_to_string(path)
                .with_context(|| format!("failed reading key file {}", path.display()))?
        } else if let Some(ref key) = self.private_key {
            key.clone()
        } else {
            return Err(anyhow!(
                "missing signer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PRIVATE_KEY)"
            ));
        };
        key.trim()
            .parse::<LocalWallet>()
            .map_err(|err| anyhow!("invalid signer key: {err}"))
    }
}

#[derive(Args, Debug)]
pub struct BillingArgs {
    /// JSON file with `{ dueAmounts: [...], periodFee }`.
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct DraftingArgs {
    /// JSON file with the period's payment-status records.
    #[arg(long)]
    pub input: PathBuf,

    /// Roles modifier the delegate signer executes through.
    #[arg(long, env = "ROLES_MODIFIER_ADDRESS", requires = "role_key")]
    pub roles_modifier: Option<Address>,

    /// Role key (32-byte hex) granting draft/fine on the billing contract.
    #[arg(long, env = "ROLE_KEY", requires = "roles_modifier")]
    pub role_key: Option<FixedBytes<32>>,

    /// Receiver of fines (defaults to the billing contract).
    #[arg(long, env = "FINE_RECIPIENT")]
    pub fine_recipient: Option<Address>,

    /// Minimum fine per account, in wei.
    #[arg(long, env = "MIN_FINE", default_value_t = U256::ZERO)]
    pub min_fine: U256,

    /// Batch relay overriding the well-known MultiSend deployment.
    ///
    /// Must accept bare 4-byte-length records; stock MultiSend does not.
    #[arg(long, env = "BATCH_RELAY_ADDRESS")]
    pub batch_relay: Option<Address>,
}

impl DraftingArgs {
    pub fn settlement_config(&self, billing_contract: Address) -> Result<SettlementConfig> {
        let authority = ExecutionAuthority::from_parts(self.roles_modifier, self.role_key)
            .ok_or_else(|| anyhow!("--roles-modifier and --role-key must be set together"))?;
        Ok(SettlementConfig {
            billing_contract,
            fine_recipient: self.fine_recipient.unwrap_or(billing_contract),
            min_fine: self.min_fine,
            authority,
            batch_relay: self.batch_relay,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn billing_contract(&self) -> Address {
        match self {
            Network::Mainnet => address!("08Cd77fEB3fB28CC1606A91E0Ea2f5e3EABa1A9a"),
            Network::Testnet => address!("2ad5fcddf209ca9e01509ecfa77115d3a9f999fa"),
        }
    }

    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://rpc.ankr.com/eth",
            Network::Testnet => "https://rpc.sepolia.org",
        }
    }
}

impl Cli {
    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.rpc_url().to_string())
    }

    pub fn billing_contract(&self) -> Address {
        self.billing_contract
            .unwrap_or_else(|| self.network.billing_contract())
    }

    /// Orchestrator configuration for the selected subcommand.
    ///
    /// Billing submits straight from the signer, so it carries no role delegation.
    pub fn settlement_config(&self) -> Result<SettlementConfig> {
        let billing_contract = self.billing_contract();
        match &self.command {
            Command::Drafting(args) => args.settlement_config(billing_contract),
            Command::Billing(_) => Ok(SettlementConfig {
                billing_contract,
                fine_recipient: billing_contract,
                min_fine: U256::ZERO,
                authority: ExecutionAuthority::Unconfigured,
                batch_relay: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafting_defaults_to_unconfigured_authority() {
        let cli = Cli::try_parse_from([
            "billing-drafter",
            "drafting",
            "--input",
            "statuses.json",
            "--private-key",
            "0x01",
        ])
        .unwrap();
        let Command::Drafting(args) = &cli.command else {
            panic!("expected drafting");
        };
        let config = args.settlement_config(cli.billing_contract()).unwrap();

        assert_eq!(config.authority, ExecutionAuthority::Unconfigured);
        assert_eq!(config.fine_recipient, Network::Testnet.billing_contract());
        assert_eq!(config.min_fine, U256::ZERO);
    }

    #[test]
    fn test_role_flags_must_be_paired() {
        let result = Cli::try_parse_from([
            "billing-drafter",
            "drafting",
            "--input",
            "statuses.json",
            "--roles-modifier",
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_delegated_authority_from_flags() {
        let cli = Cli::try_parse_from([
            "billing-drafter",
            "--network",
            "mainnet",
            "drafting",
            "--input",
            "statuses.json",
            "--roles-modifier",
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "--role-key",
            "0x0101010101010101010101010101010101010101010101010101010101010101",
            "--min-fine",
            "5",
        ])
        .unwrap();
        let Command::Drafting(args) = &cli.command else {
            panic!("expected drafting");
        };
        let config = args.settlement_config(cli.billing_contract()).unwrap();

        let role = config.authority.delegation().unwrap();
        assert_eq!(role.executor, Address::repeat_byte(0xee));
        assert_eq!(role.role_key, FixedBytes::repeat_byte(0x01));
        assert_eq!(config.billing_contract, Network::Mainnet.billing_contract());
        assert_eq!(config.min_fine, U256::from(5u64));
    }

    #[test]
    fn test_billing_config_targets_billing_contract() {
        let cli = Cli::try_parse_from([
            "billing-drafter",
            "--billing-contract",
            "0xcccccccccccccccccccccccccccccccccccccccc",
            "--confirmations",
            "3",
            "billing",
            "--input",
            "billing.json",
        ])
        .unwrap();
        let config = cli.settlement_config().unwrap();

        assert_eq!(config.billing_contract, Address::repeat_byte(0xcc));
        assert_eq!(config.authority, ExecutionAuthority::Unconfigured);
        assert_eq!(cli.confirmations, 3);
    }

    #[test]
    fn test_key_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "billing-drafter",
            "billing",
            "--input",
            "billing.json",
            "--private-key",
            "0x01",
            "--private-key-path",
            "key.txt",
        ]);
        assert!(result.is_err());
    }
}
