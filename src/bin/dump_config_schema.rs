//! Prints the JSON schema of `config.toml`, for editors and documentation.

fn main() -> anyhow::Result<()> {
    let schema = shotscribe::Config::json_schema();
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
