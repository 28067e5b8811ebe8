//! Simple CLI for exercising the B-tree engine.
//!
//! Usage:
//!   btree_cli demo
//!   btree_cli run <min_degree> <op>...
//!   btree_cli bulk <min_degree> <count>
//!
//! Ops for `run`:
//!   +K  insert K
//!   -K  delete K
//!   ?K  search K
//!   p   print keys in order
//!   s   print stats
//!   t   print tree as JSON
//!
//! Set `RUST_LOG=btree_mem=trace` to see splits, rotations and merges.

use btree_mem::{BTree, BTreeError};
use std::env;
use std::process::exit;
use tracing_subscriber::EnvFilter;

const DEMO_INSERTS: [i64; 16] = [7, 11, 3, 10, 14, 13, 1, 15, 4, 5, 20, 22, 2, 17, 12, 6];
const DEMO_DELETES: [i64; 13] = [20, 22, 2, 1, 3, 7, 10, 21, 4, 5, 17, 12, 6];

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
    }

    match args[1].as_str() {
        "demo" => demo(),

        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: btree_cli run <min_degree> <op>...");
                exit(1);
            }
            let mut tree = open_tree(&args[2]);
            for op in &args[3..] {
                if let Err(e) = apply(&mut tree, op) {
                    eprintln!("ERROR: {}", e);
                    exit(1);
                }
            }
        }

        "bulk" => {
            if args.len() < 4 {
                eprintln!("Usage: btree_cli bulk <min_degree> <count>");
                exit(1);
            }
            let mut tree = open_tree(&args[2]);
            let count: i64 = match args[3].parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("ERROR: Invalid count");
                    exit(1);
                }
            };

            let start = std::time::Instant::now();
            tree.extend(0..count);
            let elapsed = start.elapsed();

            if let Err(e) = tree.validate() {
                eprintln!("ERROR: {}", e);
                exit(1);
            }

            let ops_per_sec = count as f64 / elapsed.as_secs_f64();
            let stats = tree.stats();
            println!("INSERTED: {}", count);
            println!("TIME_MS: {}", elapsed.as_millis());
            println!("OPS_PER_SEC: {:.0}", ops_per_sec);
            println!("tree_height: {}", stats.height);
            println!("node_count: {}", stats.node_count);
        }

        command => {
            eprintln!("Unknown command: {}", command);
            exit(1);
        }
    }
}

/// Route library events to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn usage() -> ! {
    eprintln!("Usage: btree_cli <command> [args...]");
    eprintln!("Commands:");
    eprintln!("  demo                     - Run the reference insert/search/delete sequence");
    eprintln!("  run <min_degree> <op>... - Apply ops: +K insert, -K delete, ?K search,");
    eprintln!("                             p print, s stats, t tree JSON");
    eprintln!("  bulk <min_degree> <n>    - Insert n sequential keys and report timing");
    exit(1);
}

fn open_tree(degree: &str) -> BTree<i64> {
    let min_degree: usize = match degree.parse() {
        Ok(t) => t,
        Err(_) => {
            eprintln!("ERROR: Invalid minimum degree '{}'", degree);
            exit(1);
        }
    };

    match BTree::new(min_degree) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("ERROR: Failed to create tree: {}", e);
            exit(1);
        }
    }
}

fn parse_key(raw: &str) -> Result<i64, String> {
    raw.parse().map_err(|_| format!("Invalid key '{}'", raw))
}

fn apply(tree: &mut BTree<i64>, op: &str) -> Result<(), String> {
    match op {
        "p" => println!("{}", render_keys(tree)),
        "s" => {
            let stats = tree.stats();
            println!("len: {}", stats.len);
            println!("tree_height: {}", stats.height);
            println!("node_count: {}", stats.node_count);
            println!("min_degree: {}", stats.min_degree);
        }
        "t" => println!("{}", tree.export_json().map_err(|e| e.to_string())?),
        _ => {
            let mut chars = op.chars();
            let prefix = chars.next();
            let key = parse_key(chars.as_str())?;
            match prefix {
                Some('+') => {
                    if tree.insert(key) {
                        println!("OK");
                    } else {
                        println!("REPLACED");
                    }
                }
                Some('-') => match tree.delete(&key) {
                    Ok(_) => println!("DELETED"),
                    Err(BTreeError::KeyNotFound) => println!("NOT_FOUND"),
                    Err(e) => return Err(e.to_string()),
                },
                Some('?') => {
                    if tree.search(&key) {
                        println!("FOUND");
                    } else {
                        println!("NOT_FOUND");
                    }
                }
                _ => return Err(format!("Unknown op '{}'", op)),
            }
        }
    }
    Ok(())
}

fn render_keys(tree: &BTree<i64>) -> String {
    tree.traverse()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn demo() {
    let mut tree = BTree::default();
    tree.extend(DEMO_INSERTS);
    println!("{}", render_keys(&tree));
    println!();

    if tree.search(&21) {
        println!("present");
    } else {
        println!("not present");
    }
    println!();

    for key in DEMO_DELETES {
        match tree.delete(&key) {
            Ok(_) => println!("{} [{}]", render_keys(&tree), key),
            Err(BTreeError::KeyNotFound) => println!("{} [{}] NOT_FOUND", render_keys(&tree), key),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                exit(1);
            }
        }
    }
}
