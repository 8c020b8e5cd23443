use canonical::{canonicalize, CanonicalizeConfig, CanonicalizedDocument};

fn main() {
    let content = "The   Court   hereby ORDERS that the motion is GRANTED.\n\nSo ordered.";

    let cfg = CanonicalizeConfig {
        strip_punctuation: true,
        ..Default::default()
    };

    let doc: CanonicalizedDocument =
        canonicalize("demo-doc", content, &cfg).expect("canonicalization succeeds");
    println!("canonical: {}", doc.canonical_text);
    println!();
    println!("tokens: {:?}", doc.tokens);
    println!();
    println!("sha256: {}", doc.sha256_hex);
}
