//! Produit les octets du drapeau chiffré attendus par la VM

use anyhow::{anyhow, Context, Result};
use mbytev_disasm::flag::{encrypt_flag, FlagKey, DEFAULT_FLAG};
use std::env;

const USAGE: &str = "Usage: flag-enc [--r0 HEX] [--r1 HEX] [--selector HEX] [plaintext]";

fn parse_hex_u8(value: &str) -> Result<u8> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u8::from_str_radix(digits, 16).with_context(|| format!("invalid byte '{}'", value))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut key = FlagKey::default();
    let mut plain: Option<String> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            "--r0" | "--r1" | "--selector" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("{} needs a value\n{}", arg, USAGE))?;
                let byte = parse_hex_u8(&value)?;
                match arg.as_str() {
                    "--r0" => key.r0 = byte,
                    "--r1" => key.r1 = byte,
                    _ => key.selector = byte,
                }
            }
            _ => plain = Some(arg),
        }
    }

    if !key.unlocks() {
        log::warn!("the VM only decrypts with R0 = 0x7a and selector 0x42");
    }

    let plain = plain.map(String::into_bytes).unwrap_or_else(|| DEFAULT_FLAG.to_vec());
    let (enc, final_k) = encrypt_flag(&plain, &key);

    println!("// Derived key: 0x{:02x}", final_k);
    let bytes: Vec<String> = enc.iter().map(|b| format!("0x{:02x}", b)).collect();
    println!("{}", bytes.join(", "));

    Ok(())
}
