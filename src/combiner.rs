/*!
 * End-to-end combine pipeline
 *
 * selection -> dedup -> common ancestor -> collection -> depth sort,
 * then the tree and the content blocks are built from the same file list.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::assembler::{AssemblyStatistics, ContentAssembler};
use crate::collector::FileCollector;
use crate::config::Config;
use crate::diagnostics::SharedSink;
use crate::ensure;
use crate::error::{CombinerError, Result};
use crate::rules::IgnoreRules;
use crate::selection::{common_ancestor, resolve};
use crate::tree::TreeRenderer;

/// Result of one combine run
#[derive(Debug)]
pub struct Combined {
    /// Deepest directory shared by the selection
    pub common_ancestor: PathBuf,
    /// Final file list, sorted by depth
    pub files: Vec<PathBuf>,
    /// Rendered directory tree
    pub tree: String,
    /// Concatenated file blocks
    pub content: String,
    /// Counters gathered while assembling
    pub statistics: AssemblyStatistics,
    /// Failures recovered along the way
    pub errors: Vec<CombinerError>,
}

impl Combined {
    /// Full document: tree block, common parent header, then file blocks
    pub fn document(&self) -> String {
        format!(
            "================ Directory Structure ================\n{}\n\
             ================ Common Parent Directory: [{}] ================\n\n{}",
            self.tree,
            self.common_ancestor.display(),
            self.content
        )
    }

    /// Whether some part of the selection was skipped or replaced by an error
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs the whole pipeline for one configuration
pub struct Combiner {
    config: Config,
    /// Progress bar
    progress: Arc<ProgressBar>,
    sink: SharedSink,
}

impl Combiner {
    /// Create a new combiner
    pub fn new(config: Config, progress: Arc<ProgressBar>, sink: SharedSink) -> Self {
        Self {
            config,
            progress,
            sink,
        }
    }

    /// Combine the configured roots.
    ///
    /// Unreadable directories, rule files and files are recovered from and
    /// listed in [`Combined::errors`]; they never abort the run.
    pub fn combine(&self) -> Result<Combined> {
        ensure!(
            !self.config.roots.is_empty(),
            Config,
            "No paths to combine were given"
        );

        let selection = resolve(self.config.roots.iter().cloned(), self.sink.as_ref());
        let selected = selection.paths();
        let common = common_ancestor(&selected);
        self.sink.note(&format!(
            "{} root(s) after deduplication, common parent {}",
            selection.len(),
            common.display()
        ));

        let mut collector = FileCollector::new(&self.config, Arc::clone(&self.sink));
        let mut collection = collector.collect(&selection);
        collection.sort_by_depth();
        self.progress.set_length(collection.files.len() as u64);

        let (tree, tree_errors) = self.render_tree(&common, &collection.files, collector.rules());

        let assembler = ContentAssembler::new(Arc::clone(&self.progress), Arc::clone(&self.sink));
        let assembly = assembler.assemble(&collection.files);

        let mut errors = collection.errors;
        errors.extend(tree_errors);
        errors.extend(assembly.errors);

        Ok(Combined {
            common_ancestor: common,
            files: collection.files,
            tree,
            content: assembly.content,
            statistics: assembly.statistics,
            errors,
        })
    }

    /// Render the tree below `root`.
    ///
    /// Scopes already loaded by the collector are reused; only the ancestors
    /// of `root` it never visited are read here.
    fn render_tree(
        &self,
        root: &Path,
        files: &[PathBuf],
        walked: &IgnoreRules,
    ) -> (String, Vec<CombinerError>) {
        if root.as_os_str().is_empty() {
            return (String::new(), Vec::new());
        }

        let mut rules = walked.clone();
        let errors = rules.collect_upward(root, self.sink.as_ref());

        let mut renderer = TreeRenderer::new(
            files,
            rules,
            self.config.only_selected,
            Arc::clone(&self.sink),
        );
        (renderer.render(root), errors)
    }
}
