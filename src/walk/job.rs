use super::frontier::Frontier;
use crate::config::{ErrorPolicy, WalkConfig};
use crate::error::{PoolError, WalkError};
use crate::parallel::{Job, Pool, Queue};
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

/// Find every file under the directories queued on a [`Frontier`],
/// optionally following symlinked directories
///
/// Files go to `files`. With `follow_symlinks`, a symlink that resolves to a
/// directory is not walked inline; its own path, with a trailing separator,
/// is pushed back onto the frontier so some walker picks it up later. This
/// keeps the recursion in the frontier instead of the directory iterator.
///
/// Several clones of one job may run at once on different workers. They share
/// the frontier, and whichever finishes the last outstanding directory closes
/// both queues, which is what consumers of `files` wait for.
#[derive(Clone)]
pub struct DirectoryWalkJob {
    directories: Frontier,
    files: Queue<PathBuf>,
    follow_symlinks: bool,
    on_error: ErrorPolicy,
}

impl DirectoryWalkJob {
    pub fn new(directories: Frontier, files: Queue<PathBuf>, follow_symlinks: bool) -> Self {
        Self {
            directories,
            files,
            follow_symlinks,
            on_error: ErrorPolicy::default(),
        }
    }

    /// Build a job and its queues from configuration
    pub fn from_config(config: &WalkConfig) -> Self {
        let directories = Frontier::with_capacity(config.directory_queue_capacity)
            .with_cycle_detection(config.detect_cycles);
        let files = Queue::bounded(config.file_queue_capacity);

        Self::new(directories, files, config.follow_symlinks).with_error_policy(config.on_error)
    }

    pub fn with_error_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn directories(&self) -> &Frontier {
        &self.directories
    }

    pub fn files(&self) -> &Queue<PathBuf> {
        &self.files
    }

    pub fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Walk one directory tree, emitting files and queueing symlinked
    /// directories.
    ///
    /// A root that is itself a symlink is treated like any other link: it is
    /// emitted as a file, or re-queued with a trailing separator when
    /// following links. Only a re-queued path (trailing separator) is entered
    /// through the link.
    pub fn walk_directory(&self, dir: &Path) -> Result<(), WalkError> {
        let is_link = fs::symlink_metadata(dir).is_ok_and(|m| m.file_type().is_symlink());
        if is_link && !is_reentry_path(dir) {
            let result = self.visit_link(dir);
            return self.apply_policy(result);
        }

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .follow_links(false)
            .build();

        for entry in walker {
            let result = match entry {
                Ok(entry) => self.visit(&entry),
                Err(source) => Err(WalkError::Traverse {
                    root: dir.to_path_buf(),
                    source,
                }),
            };
            self.apply_policy(result)?;
        }

        Ok(())
    }

    fn visit(&self, entry: &DirEntry) -> Result<(), WalkError> {
        let path = entry.path();

        if entry.depth() > 0 && entry.path_is_symlink() {
            return self.visit_link(path);
        }
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            self.emit(path)?;
        }
        Ok(())
    }

    /// Re-queue a link to a directory when following links, otherwise emit
    /// it as a file
    fn visit_link(&self, path: &Path) -> Result<(), WalkError> {
        if self.follow_symlinks {
            let target = fs::metadata(path).map_err(|source| WalkError::Symlink {
                path: path.to_path_buf(),
                source,
            })?;
            if target.is_dir() {
                tracing::trace!("queueing symlinked directory {}", path.display());
                self.directories
                    .push(reentry_path(path))
                    .map_err(|_| WalkError::QueueClosed { queue: "directory" })?;
                return Ok(());
            }
        }
        self.emit(path)
    }

    fn emit(&self, path: &Path) -> Result<(), WalkError> {
        self.files
            .push(path.to_path_buf())
            .map_err(|_| WalkError::QueueClosed { queue: "file" })
    }

    fn apply_policy(&self, result: Result<(), WalkError>) -> Result<(), WalkError> {
        match result {
            Err(e @ (WalkError::Traverse { .. } | WalkError::Symlink { .. }))
                if self.on_error == ErrorPolicy::Skip =>
            {
                tracing::warn!("skipping: {}", e);
                Ok(())
            }
            other => other,
        }
    }

    fn finish(&self) {
        self.directories.close();
        self.files.close();
        tracing::debug!("walk complete, queues closed");
    }
}

impl Job for DirectoryWalkJob {
    fn work(&mut self) {
        // Nothing was ever seeded, or another walker already finished
        if self.directories.outstanding() == 0 {
            self.finish();
            return;
        }

        while let Some(dir) = self.directories.pop() {
            tracing::trace!("walking {}", dir.display());

            match self.walk_directory(&dir) {
                Ok(()) => {}
                Err(e @ WalkError::QueueClosed { .. }) => {
                    tracing::warn!("abandoning {}: {}", dir.display(), e);
                }
                Err(e) => fatal(&e),
            }

            if self.directories.complete_one() == 0 {
                self.finish();
                return;
            }
        }
    }
}

/// Report an unrecoverable walk error and terminate the process
fn fatal(err: &WalkError) -> ! {
    tracing::error!("{}", err);
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

/// Mark a path as a directory to re-enter by appending a separator
fn reentry_path(path: &Path) -> PathBuf {
    let mut marked = path.as_os_str().to_os_string();
    marked.push(MAIN_SEPARATOR_STR);
    PathBuf::from(marked)
}

fn is_reentry_path(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| std::path::is_separator(b as char))
}

/// Walk `roots` with `walkers` cooperating walk jobs on a dedicated pool and
/// collect every file found
pub fn collect_files<P: AsRef<Path>>(
    roots: &[P],
    config: &WalkConfig,
    walkers: usize,
) -> Result<Vec<PathBuf>, PoolError> {
    let walkers = walkers.max(1);

    // Seeding happens before any walker runs, so the frontier must not block
    let directories = Frontier::new().with_cycle_detection(config.detect_cycles);
    let files = Queue::bounded(config.file_queue_capacity);
    let job = DirectoryWalkJob::new(directories, files, config.follow_symlinks)
        .with_error_policy(config.on_error);

    for root in roots {
        if let Err(e) = job.directories().push(root.as_ref()) {
            tracing::warn!("cannot queue {}: {}", root.as_ref().display(), e);
        }
    }

    let pool = Pool::new(walkers);
    pool.start()?;
    for _ in 0..walkers {
        pool.submit(job.clone())?;
    }

    let found: Vec<PathBuf> = job.files().iter().collect();
    tracing::debug!("collected {} files with {} walkers", found.len(), walkers);

    pool.drain();
    pool.join();
    Ok(found)
}
