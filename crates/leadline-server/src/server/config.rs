use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use leadline::{DEFAULT_PROMPT, DEFAULT_ZONE, Zone, validate_sheet_name};
use std::path::PathBuf;

/// Runtime configuration for the `leadline-server` binary.
///
/// Every value can be given as a CLI flag or an environment variable (a
/// `.env` file in the working directory is loaded first). Settings are read
/// once at startup.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "leadline-server",
    version,
    about = "Records property leads and redirects visitors to a WhatsApp chat"
)]
pub struct CliArgs {
    /// TCP address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Root directory for the counter file and the lead sheets.
    ///
    /// Environment variable: `DATA_DIR`
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Identifier of the spreadsheet leads are written to. On disk this is
    /// the directory under `DATA_DIR` holding one file per sheet.
    ///
    /// Environment variable: `SPREADSHEET_ID`
    #[arg(long, env = "SPREADSHEET_ID", default_value_t = String::from("property-leads"))]
    pub spreadsheet_id: String,

    /// Sheet within the spreadsheet that receives one row per lead.
    ///
    /// Environment variable: `SHEET_NAME`
    #[arg(long, env = "SHEET_NAME", default_value_t = String::from("Property Leads"))]
    pub sheet_name: String,

    /// WhatsApp number of the agent, digits only with country code.
    ///
    /// Environment variable: `AGENT_WA`
    #[arg(long, env = "AGENT_WA", default_value_t = String::from("60143317056"))]
    pub agent_wa: String,

    /// Text placed before the `Ref:` line of the prefilled message.
    ///
    /// Environment variable: `MESSAGE_PROMPT`
    #[arg(long, env = "MESSAGE_PROMPT", default_value = DEFAULT_PROMPT)]
    pub message_prompt: String,

    /// UTC offset used for lead identifiers and timestamps, e.g. `+08:00` or
    /// `UTC`. Falls back to `DEFAULT_TIMEZONE` when unset or blank.
    ///
    /// Environment variable: `TIMEZONE`
    #[arg(long, env = "TIMEZONE")]
    pub timezone: Option<String>,

    /// Offset used when `TIMEZONE` is not set.
    ///
    /// Environment variable: `DEFAULT_TIMEZONE`
    #[arg(long, env = "DEFAULT_TIMEZONE", default_value = DEFAULT_ZONE)]
    pub default_timezone: String,

    /// Maximum time a submission waits for the sequence lock, in
    /// milliseconds. Submissions that wait longer fail with the generic error
    /// page.
    ///
    /// Environment variable: `LOCK_TIMEOUT_MS`
    #[arg(long, env = "LOCK_TIMEOUT_MS", default_value_t = 15_000)]
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub data_dir: PathBuf,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub agent_digits: String,
    pub message_prompt: String,
    pub zone: Zone,
    pub lock_timeout: Duration,
}

impl ServerConfig {
    /// Location of the counter file under the data directory.
    pub fn counter_path(&self) -> PathBuf {
        self.data_dir.join("counters.json")
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let agent_digits = args.agent_wa.trim().to_string();
        if agent_digits.is_empty() || !agent_digits.bytes().all(|b| b.is_ascii_digit()) {
            bail!(
                "AGENT_WA ({:?}) must be a phone number made of digits only",
                args.agent_wa
            );
        }

        validate_sheet_name(&args.spreadsheet_id).context("SPREADSHEET_ID is not usable")?;
        validate_sheet_name(&args.sheet_name).context("SHEET_NAME is not usable")?;

        let zone = Zone::resolve(args.timezone.as_deref(), &args.default_timezone)
            .context("TIMEZONE / DEFAULT_TIMEZONE")?;

        if args.lock_timeout_ms == 0 {
            bail!("LOCK_TIMEOUT_MS must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            data_dir: args.data_dir,
            spreadsheet_id: args.spreadsheet_id,
            sheet_name: args.sheet_name,
            agent_digits,
            message_prompt: args.message_prompt,
            zone,
            lock_timeout: Duration::from_millis(args.lock_timeout_ms),
        })
    }
}
