//! Tiered Chunking
//!
//! Split an earnings summary at several limits and show which boundary
//! produced each chunk.
//!
//! ```bash
//! cargo run --example tiered_chunking
//! ```

use docslice::{Boundary, Chunker, SizeUnit, TieredChunker};

fn main() -> docslice::Result<()> {
    let document = r"Quarterly revenue rose 18% year over year. Datacenter sales drove most of the growth, while consumer hardware was flat.

Operating costs fell in every region: logistics, support, and facilities all came in under plan. Management raised full-year guidance.

Reference build: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    println!("Document: {} chars\n", document.chars().count());

    for max in [200, 80, 30] {
        let chunker = TieredChunker::new(max, SizeUnit::Characters)?;
        let chunks = chunker.chunk(document)?;

        println!("max {max} characters -> {} chunks", chunks.len());
        for chunk in &chunks {
            let split = chunk.split_by.map_or("whole", Boundary::name);
            println!("  [{}] {:>3} chars, {:<10} {:?}", chunk.index, chunk.size, split, chunk.text);
        }
        println!();

        // Nothing is lost: the chunks are the document, cut into pieces.
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, document);
    }

    // Token limits measure with the cl100k_base tokenizer.
    let chunker = TieredChunker::new(24, SizeUnit::Tokens)?;
    let chunks = chunker.chunk(document)?;
    println!("max 24 tokens -> {} chunks", chunks.len());
    for chunk in &chunks {
        println!("  [{}] {:>2} tokens {:?}", chunk.index, chunk.size, chunk.text);
    }

    Ok(())
}
