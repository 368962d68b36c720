use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde_json::json;
use wfd_diff::{DiffConfig, DiffNode, NodeLevel, NullMonitor, WorkflowDiffer, WorkflowTree};
use wfd_types::{ChangeKind, WorkflowSnapshot};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Compare(args) => cmd_compare(args, cli.format),
        Command::Sequences(args) => cmd_sequences(args, cli.format),
    }
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => DiffConfig::load(path)?,
        None => DiffConfig::default(),
    };
    if args.changes_only {
        config.include_pseudo_conflicts = false;
    }

    let differ = WorkflowDiffer::new(config);
    let root = differ
        .try_compare_files(&args.left, &args.right, &NullMonitor)
        .with_context(|| {
            format!(
                "comparison of {} and {} unavailable",
                args.left.display(),
                args.right.display()
            )
        })?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&root)?),
        OutputFormat::Text => {
            print!("{}", render_tree(&root));
            println!("\n{}", summary(&root));
        }
    }
    Ok(())
}

fn cmd_sequences(args: SequencesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = WorkflowSnapshot::load(&args.file)?;
    let tree = WorkflowTree::build(&snapshot);
    let mut levels = Vec::new();
    collect_levels("workflow".into(), &tree.root, &mut levels);

    match format {
        OutputFormat::Json => {
            let value: Vec<_> = levels
                .iter()
                .map(|(label, level)| {
                    let sequences: Vec<Vec<String>> = level
                        .sequences()
                        .iter()
                        .map(|s| s.nodes().iter().map(|n| n.id.to_string()).collect())
                        .collect();
                    json!({ "level": label, "sequences": sequences })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print!("{}", render_levels(&levels)),
    }
    Ok(())
}

fn marker(kind: ChangeKind) -> ColoredString {
    let symbol = kind.symbol().to_string();
    match kind {
        ChangeKind::Addition => symbol.green().bold(),
        ChangeKind::Deletion => symbol.red().bold(),
        ChangeKind::Change => symbol.yellow().bold(),
        ChangeKind::PseudoConflict => symbol.dimmed(),
        ChangeKind::NoChange => symbol.normal(),
    }
}

/// One line per diff node, indented by depth.
fn render_tree(root: &DiffNode) -> String {
    let mut out = String::new();
    for (depth, node) in root.walk() {
        let label = match (&node.left, &node.right) {
            (Some(l), Some(r)) if l.name != r.name => format!("{} → {}", l.name, r.name),
            _ => node.name().to_string(),
        };
        let node_type = node
            .right
            .as_ref()
            .or(node.left.as_ref())
            .map_or("", |r| r.node_type.as_str());
        let id = node
            .left
            .as_ref()
            .or(node.right.as_ref())
            .filter(|r| !r.id.is_workflow())
            .map(|r| format!(" #{}", r.id))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}{} {} {}{}\n",
            "  ".repeat(depth),
            marker(node.kind),
            label.bold(),
            format!("[{node_type}]").dimmed(),
            id.dimmed(),
        ));
    }
    out
}

fn summary(root: &DiffNode) -> String {
    if !root.has_differences() {
        return format!("{} no differences", "✓".green().bold());
    }
    format!(
        "{} changed, {} added, {} deleted",
        below_root(root, ChangeKind::Change).to_string().yellow(),
        root.count(ChangeKind::Addition).to_string().green(),
        root.count(ChangeKind::Deletion).to_string().red(),
    )
}

/// Like [`DiffNode::count`], without the root itself.
fn below_root(root: &DiffNode, kind: ChangeKind) -> usize {
    root.children.iter().map(|c| c.count(kind)).sum()
}

fn collect_levels<'a>(
    label: String,
    level: &'a NodeLevel,
    out: &mut Vec<(String, &'a NodeLevel)>,
) {
    out.push((label, level));
    for node in level.nodes() {
        if let Some(children) = &node.children {
            collect_levels(format!("{} #{}", node.name, node.id), children, out);
        }
    }
}

fn render_levels(levels: &[(String, &NodeLevel)]) -> String {
    let mut out = String::new();
    for (label, level) in levels {
        out.push_str(&format!("{}\n", label.bold()));
        if level.is_empty() {
            out.push_str(&format!("  {}\n", "(empty)".dimmed()));
        }
        for (i, sequence) in level.sequences().iter().enumerate() {
            let names: Vec<&str> = sequence.nodes().iter().map(|n| n.name.as_str()).collect();
            out.push_str(&format!(
                "  {} {}\n",
                format!("[{i}]").cyan(),
                names.join(" → ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfd_types::{NodeKind, SnapshotNode};

    fn plain() {
        colored::control::set_override(false);
    }

    fn pipeline(with_writer: bool) -> WorkflowSnapshot {
        let inner = WorkflowSnapshot::new("inner")
            .with_node(SnapshotNode::native(0, "Filter", "row.filter"));
        let mut wf = WorkflowSnapshot::new("etl")
            .with_node(SnapshotNode::native(0, "Reader", "io.csv"))
            .with_node(SnapshotNode::container(1, "Clean", NodeKind::MetaNode, inner))
            .connect(0, 1);
        if with_writer {
            wf = wf
                .with_node(SnapshotNode::native(2, "Writer", "io.csv.write"))
                .connect(1, 2);
        }
        wf
    }

    #[test]
    fn tree_marks_each_kind() {
        plain();
        let differ = WorkflowDiffer::new(DiffConfig::default());
        let root = differ.compare(&pipeline(false), &pipeline(true)).unwrap();
        let text = render_tree(&root);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "~ etl [workflow]");
        assert_eq!(lines[1], "  = Reader [io.csv] #0");
        assert_eq!(lines[2], "  = Clean [metanode] #1");
        assert_eq!(lines[3], "    = Filter [row.filter] #1:0");
        assert_eq!(lines[4], "  + Writer [io.csv.write] #2");
        assert_eq!(summary(&root), "0 changed, 1 added, 0 deleted");
    }

    #[test]
    fn identical_workflows_summary() {
        plain();
        let differ = WorkflowDiffer::new(DiffConfig::changes_only());
        let root = differ.compare(&pipeline(true), &pipeline(true)).unwrap();
        assert_eq!(render_tree(&root), "  etl [workflow]\n");
        assert_eq!(summary(&root), "✓ no differences");
    }

    #[test]
    fn renamed_node_shows_both_names() {
        plain();
        let left = WorkflowSnapshot::new("wf").with_node(SnapshotNode::native(0, "Reader", "io.csv"));
        let right =
            WorkflowSnapshot::new("wf").with_node(SnapshotNode::native(0, "CSV In", "io.csv"));
        let root = WorkflowDiffer::new(DiffConfig::default())
            .compare(&left, &right)
            .unwrap();
        let text = render_tree(&root);
        assert!(text.contains("~ Reader → CSV In [io.csv] #0"));
    }

    #[test]
    fn levels_include_containers() {
        plain();
        let tree = WorkflowTree::build(&pipeline(true));
        let mut levels = Vec::new();
        collect_levels("workflow".into(), &tree.root, &mut levels);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].0, "Clean #1");

        let text = render_levels(&levels);
        assert_eq!(
            text,
            "workflow\n  [0] Reader → Clean → Writer\nClean #1\n  [0] Filter\n"
        );
    }

    #[test]
    fn empty_level_is_marked() {
        plain();
        let tree = WorkflowTree::build(&WorkflowSnapshot::new("empty"));
        let levels = vec![("workflow".to_string(), &tree.root)];
        assert_eq!(render_levels(&levels), "workflow\n  (empty)\n");
    }

    #[test]
    fn compare_reports_unavailable_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompareArgs {
            left: dir.path().join("missing-left.json"),
            right: dir.path().join("missing-right.json"),
            config: None,
            changes_only: false,
        };
        let err = cmd_compare(args, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
