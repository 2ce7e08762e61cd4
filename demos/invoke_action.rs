//! Invokes a named member on the root object with key=value arguments.
//!
//! Usage: cargo run --example invoke_action -- http://localhost:8080/ search q=term

use serde_json::Value;
use sirena::{Args, SirenClient};

#[tokio::main]
async fn main() -> Result<(), sirena::Error> {
    tracing_subscriber::fmt().init();

    let usage = "usage: invoke_action <root-url> <member> [key=value ...]";
    let mut cli = std::env::args().skip(1);
    let root_url = cli.next().expect(usage);
    let member = cli.next().expect(usage);

    let mut args = Args::new();
    for pair in cli {
        let (key, value) = pair.split_once('=').expect("arguments look like key=value");
        args.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    let client = SirenClient::builder().build()?;
    let Some(root) = client.connect(&root_url).await? else {
        println!("{root_url}: no such resource");
        return Ok(());
    };

    match root.invoke(&member, &args).await? {
        Some(next) => {
            println!("-> {}", next.classname());
            for (name, value) in next.fields() {
                println!("   {name} = {value}");
            }
        }
        None => println!("-> absent (404)"),
    }

    Ok(())
}
