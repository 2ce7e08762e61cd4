//! Connects to a siren API root and prints what the object exposes.
//!
//! Usage: cargo run --example navigate -- http://localhost:8080/

use sirena::SirenClient;

#[tokio::main]
async fn main() -> Result<(), sirena::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let root_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/".to_owned());

    let client = SirenClient::builder().build()?;
    let Some(root) = client.connect(&root_url).await? else {
        println!("{root_url}: no such resource");
        return Ok(());
    };

    println!("class: {}", root.classname());
    for (name, value) in root.fields() {
        println!("field  {name} = {value}");
    }

    let mut members: Vec<_> = root.member_names().collect();
    members.sort_unstable();
    for name in members {
        println!("member {name}()");
    }

    Ok(())
}
