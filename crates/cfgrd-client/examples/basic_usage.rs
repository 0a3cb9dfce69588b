//! Basic usage example for cfgrd-client

use std::sync::Arc;
use std::time::Duration;

use cfgrd_client::{ClientSettings, ConfigClient, Decrypt};

fn main() -> cfgrd_client::Result<()> {
    // Lay out a small config tree to load from
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("default.properties"),
        "app.name=orders\n\
         db.host=localhost\n\
         db.port=5432\n\
         db.url=postgres://${db.host}:${db.port}/${app.name}\n\
         db.password=ENC(czNjcjN0)\n",
    )
    .expect("write fixture");

    // Decryption is pluggable; this one only tags the ciphertext
    let decryptor: Arc<dyn Decrypt> = Arc::new(|ciphertext: &str| Some(format!("<{ciphertext}>")));

    let client = ConfigClient::init(
        ClientSettings::absolute(format!("file:{}", dir.path().display()))
            .with_environment("dev")
            .with_decryptor(decryptor)
            .with_refresh_interval(Duration::from_secs(30)),
    )?;

    println!("Loaded {} properties", client.snapshot().len());

    // Raw and typed reads against the published snapshot
    println!("db.url = {:?}", client.get("db.url"));
    let port: Option<u16> = client.get_as("db.port")?;
    println!("db.port = {port:?}");
    let pool: u32 = client.get_or("db.pool.size", 8)?;
    println!("db.pool.size (defaulted) = {pool}");
    println!("db.password = {:?}", client.get("db.password"));

    // The environment layer always merges last; `env` was set above
    println!("env = {:?}", client.get("env"));

    client.stop_refresh();
    Ok(())
}
