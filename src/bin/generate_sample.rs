use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a deterministic research paper table for trying out the dashboard.
#[derive(Debug, Parser)]
struct Args {
    /// Number of papers.
    #[arg(long, default_value_t = 120)]
    rows: usize,

    /// Output path; defaults to research_papers.csv (or .parquet).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write Parquet instead of CSV.
    #[arg(long)]
    parquet: bool,
}

const ADJECTIVES: [&str; 8] = [
    "Deep", "Shallow", "Scalable", "Robust", "Efficient", "Sparse", "Federated", "Causal",
];
const TOPICS: [&str; 8] = [
    "Learning", "Parsing", "Retrieval", "Graph Networks", "Transformers", "Optimization",
    "Segmentation", "Inference",
];
const SUFFIXES: [&str; 6] = [
    "Basics", "at Scale", "Revisited", "for Low-Resource Settings", "in Practice", "",
];
const SURNAMES: [&str; 10] = [
    "Smith", "Lee", "Okoro", "Garcia", "Ivanova", "Chen", "Novak", "Haddad", "Silva", "Kim",
];
const CATEGORIES: [&str; 5] = ["ML", "NLP", "CV", "IR", "Systems"];
const VENUES: [&str; 5] = ["NeurIPS", "ACL", "CVPR", "SIGIR", "OSDI"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

struct Paper {
    title: String,
    authors: String,
    year: i64,
    category: String,
    venue: String,
    citations: i64,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<Paper> {
    (0..rows)
        .map(|_| {
            let title = format!(
                "{} {} {}",
                rng.pick(&ADJECTIVES),
                rng.pick(&TOPICS),
                rng.pick(&SUFFIXES)
            )
            .trim_end()
            .to_string();

            let n_authors = 1 + rng.below(3);
            let authors = (0..n_authors)
                .map(|_| {
                    let initial = (b'A' + rng.below(26) as u8) as char;
                    format!("{initial}. {}", rng.pick(&SURNAMES))
                })
                .collect::<Vec<_>>()
                .join("; ");

            let category = rng.below(CATEGORIES.len());
            Paper {
                title,
                authors,
                year: 2015 + rng.below(10) as i64,
                category: CATEGORIES[category].to_string(),
                venue: VENUES[category].to_string(),
                citations: rng.below(500) as i64,
            }
        })
        .collect()
}

fn write_csv(path: &Path, papers: &[Paper]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["title", "authors", "year", "category", "venue", "citations"])?;
    for p in papers {
        let year = p.year.to_string();
        let citations = p.citations.to_string();
        writer.write_record([
            p.title.as_str(),
            p.authors.as_str(),
            year.as_str(),
            p.category.as_str(),
            p.venue.as_str(),
            citations.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, papers: &[Paper]) -> Result<()> {
    let strings = |f: fn(&Paper) -> &str| {
        StringArray::from(papers.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("authors", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("venue", DataType::Utf8, false),
        Field::new("citations", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|p| p.title.as_str())),
            Arc::new(strings(|p| p.authors.as_str())),
            Arc::new(Int64Array::from_iter_values(papers.iter().map(|p| p.year))),
            Arc::new(strings(|p| p.category.as_str())),
            Arc::new(strings(|p| p.venue.as_str())),
            Arc::new(Int64Array::from_iter_values(papers.iter().map(|p| p.citations))),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(42);
    let papers = generate(args.rows, &mut rng);

    let default_name = if args.parquet {
        "research_papers.parquet"
    } else {
        "research_papers.csv"
    };
    let path = args.out.unwrap_or_else(|| PathBuf::from(default_name));

    if args.parquet {
        write_parquet(&path, &papers)?;
    } else {
        write_csv(&path, &papers)?;
    }

    println!("Wrote {} papers to {}", papers.len(), path.display());
    Ok(())
}
