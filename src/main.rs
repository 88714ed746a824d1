use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use itertools::Itertools;
use navtree::tree::builder::{PrefixForest, PrefixForestBuilder, PrefixNode};
use navtree::tree::TreeNodeId;
use navtree::Navigate;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "navtree",
    about = "Fold keyed lines into a forest and walk it in pre-order or reverse pre-order"
)]
struct Cli {
    /// File with one `a/b/c[=value]` element per line, `-` for stdin.
    input: PathBuf,
    /// Separator between key segments.
    #[arg(long, short, default_value = "/")]
    separator: String,
    /// What to print.
    #[arg(long, short, value_enum, default_value_t = Order::Draw)]
    order: Order,
    /// Key of the node the walk starts from.
    #[arg(long, value_name = "KEY")]
    start: Option<String>,
    /// More output on stderr, repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Parents before children, children in order.
    Forward,
    /// Exactly the forward order, backwards.
    Inverse,
    /// The forest as an indented drawing.
    Draw,
}

type Keyed = PrefixForest<String, String>;

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let text = read_input(&cli.input)?;
    let forest = parse_forest(&text, &cli.separator)?;

    let start = cli
        .start
        .as_deref()
        .map(|key| find_start(&forest, key, &cli.separator))
        .transpose()?;

    for line in walk(&forest, cli.order, start, &cli.separator)? {
        println!("{line}");
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn find_start(forest: &Keyed, key: &str, separator: &str) -> Result<TreeNodeId> {
    forest
        .find(split_key(key, separator))
        .ok_or_else(|| anyhow!("no element has the key {key:?}"))
}

fn split_key(key: &str, separator: &str) -> Vec<String> {
    key.split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Lines are `key` or `key=value`; blank lines and `#` comments are skipped.
fn parse_forest(text: &str, separator: &str) -> Result<Keyed> {
    let mut builder = PrefixForestBuilder::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value.trim().to_owned())),
            None => (line, None),
        };
        builder
            .push(split_key(key, separator), value)
            .with_context(|| format!("line {}: {line:?}", number + 1))?;
    }

    let forest = builder.build();
    info!(
        nodes = forest.forest().n_nodes(),
        trees = forest.forest().n_roots(),
        "parsed input"
    );
    Ok(strip_missing(forest))
}

/// Prefix-only nodes and valueless lines both carry no value.
fn strip_missing(forest: PrefixForest<String, Option<String>>) -> Keyed {
    forest.map_values(|value| value)
}

fn label(node: &PrefixNode<String, String>) -> String {
    match &node.value {
        Some(value) => format!("{}={value}", node.segment),
        None => node.segment.clone(),
    }
}

fn draw(forest: &Keyed) -> String {
    let drawing = forest.forest().debug_draw(|node| Some(label(node)));
    drawing.trim_end().to_owned()
}

fn render(forest: &Keyed, node: TreeNodeId, separator: &str) -> String {
    let key = forest.key_of(node).into_iter().join(separator);
    match &forest.forest()[node].value {
        Some(value) => format!("{key}={value}"),
        None => key,
    }
}

fn root_of(forest: &Keyed, node: TreeNodeId) -> Result<TreeNodeId> {
    let nodes = forest.forest();
    Ok(nodes.root_node(nodes.root(node))?)
}

fn walk(
    forest: &Keyed,
    order: Order,
    start: Option<TreeNodeId>,
    separator: &str,
) -> Result<Vec<String>> {
    match (order, start) {
        (Order::Draw, Some(_)) => bail!("--start only applies to forward and inverse walks"),
        (Order::Draw, None) => Ok(vec![draw(forest)]),
        (Order::Forward, start) => forward(forest, start, separator),
        (Order::Inverse, start) => inverse(forest, start, separator),
    }
}

fn forward(forest: &Keyed, start: Option<TreeNodeId>, separator: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    match start {
        Some(start) => {
            let root = root_of(forest, start)?;
            debug!(%root, %start, "forward walk");
            for node in forest.preorder_from(root, start)? {
                lines.push(render(forest, node, separator));
            }
        }
        None => {
            for (_, &root) in forest.forest().iter_roots() {
                debug!(%root, "forward walk");
                lines.extend(forest.preorder(root).map(|n| render(forest, n, separator)));
            }
        }
    }
    Ok(lines)
}

fn inverse(forest: &Keyed, start: Option<TreeNodeId>, separator: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    match start {
        Some(start) => {
            let root = root_of(forest, start)?;
            debug!(%root, %start, "inverse walk");
            for node in forest.inverse_preorder_from(root, start)? {
                lines.push(render(forest, node, separator));
            }
        }
        None => {
            let roots: Vec<TreeNodeId> = forest.forest().iter_roots().map(|(_, &r)| r).collect();
            for root in roots.into_iter().rev() {
                debug!(%root, "inverse walk");
                lines.extend(
                    forest
                        .inverse_preorder(root)
                        .map(|n| render(forest, n, separator)),
                );
            }
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod test {
    use navtree::tree::ForestError;
    use similar_asserts::assert_eq;

    use super::*;

    const INPUT: &str = "
# two trees
a/b=1

a/c
 x / y = 2
";

    fn sample() -> Keyed {
        parse_forest(INPUT, "/").unwrap()
    }

    fn lines(forest: &Keyed, order: Order, start: Option<&str>) -> Vec<String> {
        let start = start.map(|key| find_start(forest, key, "/").unwrap());
        walk(forest, order, start, "/").unwrap()
    }

    #[test]
    fn keys_are_trimmed_and_empty_segments_dropped() {
        assert_eq!(split_key(" a // b /", "/"), vec!["a", "b"]);
        assert_eq!(split_key("a::b", "::"), vec!["a", "b"]);
        assert!(split_key("/ /", "/").is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let forest = sample();
        assert_eq!(forest.forest().n_nodes(), 5);
        assert_eq!(forest.forest().n_roots(), 2);
        assert_eq!(forest.get(split_key("x/y", "/")), Some(&String::from("2")));
        assert_eq!(forest.get(split_key("a/c", "/")), None);
    }

    #[test]
    fn value_is_everything_after_the_first_equals() {
        let forest = parse_forest("k=a=b\nempty=", "/").unwrap();
        assert_eq!(forest.get(split_key("k", "/")), Some(&String::from("a=b")));

        let empty = forest.find(split_key("empty", "/")).unwrap();
        assert_eq!(render(&forest, empty, "/"), "empty=");
    }

    #[test]
    fn forward_walks_every_tree_in_order() {
        let forest = sample();
        assert_eq!(
            lines(&forest, Order::Forward, None),
            vec!["a", "a/b=1", "a/c", "x", "x/y=2"]
        );
        assert_eq!(lines(&forest, Order::Forward, Some("a/c")), vec!["a/c"]);
        assert_eq!(lines(&forest, Order::Forward, Some("x")), vec!["x", "x/y=2"]);
    }

    #[test]
    fn inverse_walks_trees_last_first() {
        let forest = sample();
        assert_eq!(
            lines(&forest, Order::Inverse, None),
            vec!["x/y=2", "x", "a/c", "a/b=1", "a"]
        );
        assert_eq!(
            lines(&forest, Order::Inverse, Some("a/c")),
            vec!["a/c", "a/b=1", "a"]
        );
    }

    #[test]
    fn separator_is_used_for_output() {
        let forest = parse_forest("a.b=1", ".").unwrap();
        let start = find_start(&forest, "a.b", ".").unwrap();
        assert_eq!(
            walk(&forest, Order::Inverse, Some(start), ".").unwrap(),
            vec!["a.b=1", "a"]
        );
    }

    #[test]
    fn drawing() {
        let forest = sample();
        let drawing = lines(&forest, Order::Draw, None).join("\n");
        insta::assert_snapshot!(drawing, @r"
        0:a
        ├── 1:b=1
        └── 2:c
        3:x
        └── 4:y=2
        ");
    }

    #[test]
    fn start_is_rejected_for_drawings() {
        let forest = sample();
        let start = find_start(&forest, "a", "/").unwrap();
        assert!(walk(&forest, Order::Draw, Some(start), "/").is_err());
    }

    #[test]
    fn unknown_start_is_an_error() {
        let err = find_start(&sample(), "a/zzz", "/").unwrap_err();
        assert_eq!(err.to_string(), r#"no element has the key "a/zzz""#);
    }

    #[test]
    fn empty_key_names_the_line() {
        let err = parse_forest("a/b=1\n=2", "/").unwrap_err();
        assert_eq!(err.to_string(), r#"line 2: "=2""#);
        assert_eq!(
            err.downcast_ref::<ForestError>(),
            Some(&ForestError::EmptyKey { position: 1 })
        );
    }

    #[test]
    fn duplicate_key_names_the_line() {
        let err = parse_forest("a\n# again\n a ", "/").unwrap_err();
        assert_eq!(err.to_string(), r#"line 3: "a""#);
        assert_eq!(
            err.downcast_ref::<ForestError>(),
            Some(&ForestError::DuplicateKey { position: 1 })
        );
    }
}
