//! Key and signature helper for passport owners
//!
//! ```text
//! dpp-keygen                         generate a key pair
//! dpp-keygen sign <SECRET> <MESSAGE> sign a message with a base64 secret key
//! ```
//!
//! Output is JSON so it can be pasted into request bodies.

use std::env;
use std::error::Error;
use std::process::ExitCode;

use serde::Serialize;

use passport_core::KeyPair;

#[derive(Serialize)]
struct GeneratedKeys {
    /// Owner identity and verification key
    public_key_base64: String,
    /// 32-byte seed
    secret_key_base64: String,
    /// 64-byte seed-plus-public-key form used by NaCl wallets
    keypair_base64: String,
}

fn generate() -> Result<String, Box<dyn Error>> {
    let kp = KeyPair::generate();
    let keys = GeneratedKeys {
        public_key_base64: kp.public_key_base64(),
        secret_key_base64: kp.secret_key_base64(),
        keypair_base64: kp.keypair_base64(),
    };
    Ok(serde_json::to_string_pretty(&keys)?)
}

fn sign(secret_b64: &str, message: &str) -> Result<String, Box<dyn Error>> {
    let kp = KeyPair::from_secret_base64(secret_b64)?;
    Ok(serde_json::to_string_pretty(&kp.sign(message))?)
}

fn run(args: &[String]) -> Result<String, Box<dyn Error>> {
    match args {
        [] => generate(),
        [cmd] if cmd == "generate" => generate(),
        [cmd, secret, message] if cmd == "sign" => sign(secret, message),
        _ => Err("usage: dpp-keygen [generate | sign <SECRET_BASE64> <MESSAGE>]".into()),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
