//! `assetlock commit` — Print the hash lock for a preimage.

use assetlock_crypto::{generate_preimage, Preimage};
use clap::Args;

#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Preimage to commit to. A random one is generated when omitted.
    pub preimage: Option<String>,

    /// Treat the preimage as base64 rather than raw text.
    #[arg(long)]
    pub base64: bool,
}

pub fn run(args: &CommitArgs) -> anyhow::Result<()> {
    let preimage = match &args.preimage {
        Some(encoded) if args.base64 => Preimage::from_base64(encoded)?,
        Some(text) => Preimage::new(text.as_bytes()),
        None => {
            let generated = generate_preimage();
            println!("Preimage:  {}", generated.to_base64());
            generated
        }
    };

    println!("Hash lock: {}", preimage.commitment());
    Ok(())
}
