//! Maintenance commands

use clap::{Args, Subcommand};
use docwarden_maint::{KeywordField, LengthOptions, Maintainer};

use crate::output::print_outcome;
use crate::AppContext;

#[derive(Args)]
pub struct MaintainArgs {
    #[command(subcommand)]
    pub command: MaintainCommands,
}

#[derive(Subcommand)]
pub enum MaintainCommands {
    /// Remove undersized documents; split or remove oversized ones
    Lengths {
        /// Minimum trimmed length in characters (default: from config)
        #[arg(long)]
        min: Option<usize>,
        /// Maximum length in characters (default: from config)
        #[arg(long)]
        max: Option<usize>,
        /// Split oversized documents into fragments (the default)
        #[arg(long, conflicts_with_all = ["delete_large", "keep_large"])]
        split: bool,
        /// Delete oversized documents instead of splitting them
        #[arg(long, conflicts_with = "keep_large")]
        delete_large: bool,
        /// Leave oversized documents in place
        #[arg(long)]
        keep_large: bool,
    },
    /// Delete documents containing a keyword
    Keyword {
        /// Substring to match
        keyword: String,
        /// Field to search
        #[arg(long, default_value = "documents")]
        field: KeywordField,
    },
    /// Delete documents whose id is not a string
    CleanupIds,
}

pub async fn run(args: &MaintainArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let maintainer = Maintainer::new(ctx.store.clone(), ctx.error_log.clone());
    let collection = ctx.collection.as_str();

    let succeeded = match &args.command {
        MaintainCommands::Lengths {
            min,
            max,
            split: _,
            delete_large,
            keep_large,
        } => {
            let options = LengthOptions {
                min_length: min.unwrap_or(ctx.config.min_length),
                max_length: max.unwrap_or(ctx.config.max_length),
                split_large: !delete_large && !keep_large,
                delete_large: *delete_large,
            };
            tracing::info!("Running length pass on {} with {:?}", collection, options);
            print_outcome(maintainer.maintain_lengths(collection, &options).await, ctx.format)?
        }
        MaintainCommands::Keyword { keyword, field } => print_outcome(
            maintainer.delete_by_keyword(collection, keyword, *field).await,
            ctx.format,
        )?,
        MaintainCommands::CleanupIds => print_outcome(
            maintainer.cleanup_invalid_ids(collection).await,
            ctx.format,
        )?,
    };

    if !succeeded {
        anyhow::bail!("Maintenance failed on collection '{}'", collection);
    }
    Ok(())
}
