extern crate rustc_version;
use rustc_version::{version_meta, Channel};

fn main() {
    // The frozen-abi derives on the account state only expand on compilers
    // that support specialization.
    match version_meta().map(|meta| meta.channel) {
        Ok(Channel::Nightly) | Ok(Channel::Dev) => {
            println!("cargo:rustc-cfg=RUSTC_WITH_SPECIALIZATION");
        }
        _ => {
            println!("cargo:rustc-cfg=RUSTC_WITHOUT_SPECIALIZATION");
        }
    }
}
