use std::io::stdin;
use vdf_tokenizer::Tokenizer;

fn main() {
    println!("=== Tokens ===");
    for tok in Tokenizer::new(stdin().lock()) {
        println!("{} {:?} {:?}", tok.position, tok.kind, tok.text);
        if let Some(err) = tok.error {
            println!("  error: {}", err);
        }
    }
}
