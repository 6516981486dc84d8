mod blockchain;
mod clock;
mod config;
mod error;
mod payload;

use dotenvy::dotenv;
use log::info;

use blockchain::Chain;
use config::Config;
use error::LedgerError;
use payload::transfer;

fn main() -> Result<(), LedgerError> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env()?;
    info!("starting ledger with difficulty {}", config.difficulty);

    let mut chain = Chain::new(config.difficulty)?;

    // record transfers for Alice, Bob, John and Dani
    chain.append(transfer("Alice", "Bob", 5.0)?);
    chain.append(transfer("John", "Bob", 2.0)?);
    chain.append(transfer("Dani", "Bob", 27.0)?);
    chain.append(transfer("Bob", "Dani", 50.0)?);

    for digest in chain.digests() {
        println!("{digest}");
    }
    info!(
        "ledger holds {} blocks at difficulty {}",
        chain.len(),
        chain.difficulty()
    );
    println!("{}", chain.is_valid());
    Ok(())
}
