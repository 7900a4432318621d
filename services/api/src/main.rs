use property_details_api::{run, RunError};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        Err(RunError::Lookup(err)) => {
            println!("Error: {err}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("application error: {err}");
            std::process::exit(1);
        }
    }
}
