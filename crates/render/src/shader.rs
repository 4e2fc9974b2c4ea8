//! Shader programs built from a vertex and a fragment source file, with
//! modification-time polling for hot reload.
//!
//! Compile and link failures are fatal by contract: every fallible call
//! returns the diagnostic and callers are expected to abort rather than keep
//! an older program alive.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Pipeline stage a source file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors from loading, compiling, or linking shader programs.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile {stage} shader {}:\n{log}", .path.display())]
    Compile {
        stage: Stage,
        path: PathBuf,
        log: String,
    },
    #[error("failed to link program:\n{log}")]
    Link { log: String },
}

/// Source text for one stage, with the file it came from.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub stage: Stage,
    pub path: PathBuf,
    pub text: String,
}

impl StageSource {
    pub fn read(stage: Stage, path: &Path) -> Result<Self, ShaderError> {
        let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            stage,
            path: path.to_path_buf(),
            text,
        })
    }
}

/// Both stages of a program, ready to hand to a backend.
#[derive(Debug, Clone)]
pub struct ShaderStages {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

/// Compiles and links shader stages into GPU program handles.
pub trait ShaderBackend {
    type Program;

    /// Compile both stages and link them. Errors carry the compiler log.
    fn link(&mut self, stages: &ShaderStages) -> Result<Self::Program, ShaderError>;

    /// Free a program that has been replaced.
    fn release(&mut self, program: Self::Program);
}

/// A source path plus the modification time seen when it was last compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFile {
    path: PathBuf,
    modified: SystemTime,
}

impl WatchedFile {
    fn stat(path: &Path) -> Result<Self, ShaderError> {
        Ok(Self {
            path: path.to_path_buf(),
            modified: modified_time(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, ShaderError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Result of a poll that found at least one source file changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleSources {
    pub vertex: Option<SystemTime>,
    pub fragment: Option<SystemTime>,
}

/// A linked program together with the files it was built from.
#[derive(Debug)]
pub struct ShaderProgram<P> {
    program: P,
    vertex: WatchedFile,
    fragment: WatchedFile,
}

impl<P> ShaderProgram<P> {
    /// Compile and link the two source files.
    pub fn load<B>(
        backend: &mut B,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError>
    where
        B: ShaderBackend<Program = P>,
    {
        // Stat before reading so an edit racing the read is caught next poll.
        let vertex = WatchedFile::stat(vertex_path.as_ref())?;
        let fragment = WatchedFile::stat(fragment_path.as_ref())?;
        Self::build(backend, vertex, fragment)
    }

    fn build<B>(
        backend: &mut B,
        vertex: WatchedFile,
        fragment: WatchedFile,
    ) -> Result<Self, ShaderError>
    where
        B: ShaderBackend<Program = P>,
    {
        let stages = ShaderStages {
            vertex: StageSource::read(Stage::Vertex, &vertex.path)?,
            fragment: StageSource::read(Stage::Fragment, &fragment.path)?,
        };
        let program = backend.link(&stages)?;
        tracing::debug!(
            vertex = %vertex.path.display(),
            fragment = %fragment.path.display(),
            "linked shader program"
        );
        Ok(Self {
            program,
            vertex,
            fragment,
        })
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn vertex(&self) -> &WatchedFile {
        &self.vertex
    }

    pub fn fragment(&self) -> &WatchedFile {
        &self.fragment
    }

    pub fn into_program(self) -> P {
        self.program
    }

    /// Stat both sources. Returns `Some` if either differs from the recorded time.
    pub fn poll(&self) -> Result<Option<StaleSources>, ShaderError> {
        let vertex = modified_time(&self.vertex.path)?;
        let fragment = modified_time(&self.fragment.path)?;
        let stale = StaleSources {
            vertex: (vertex != self.vertex.modified).then_some(vertex),
            fragment: (fragment != self.fragment.modified).then_some(fragment),
        };
        if stale.vertex.is_none() && stale.fragment.is_none() {
            return Ok(None);
        }
        Ok(Some(stale))
    }

    /// Build a replacement program from the current sources. `self` is left
    /// untouched; the caller swaps and releases the old handle.
    pub fn reload<B>(&self, backend: &mut B, stale: &StaleSources) -> Result<Self, ShaderError>
    where
        B: ShaderBackend<Program = P>,
    {
        let vertex = WatchedFile {
            path: self.vertex.path.clone(),
            modified: stale.vertex.unwrap_or(self.vertex.modified),
        };
        let fragment = WatchedFile {
            path: self.fragment.path.clone(),
            modified: stale.fragment.unwrap_or(self.fragment.modified),
        };
        Self::build(backend, vertex, fragment)
    }

    /// Poll, and if a source changed, relink and swap in the new program.
    ///
    /// Returns whether a reload happened.
    pub fn refresh<B>(&mut self, backend: &mut B) -> Result<bool, ShaderError>
    where
        B: ShaderBackend<Program = P>,
    {
        let Some(stale) = self.poll()? else {
            return Ok(false);
        };
        if stale.vertex.is_some() {
            tracing::info!("vertex shader modified: {}", self.vertex.path.display());
        }
        if stale.fragment.is_some() {
            tracing::info!("fragment shader modified: {}", self.fragment.path.display());
        }
        let next = self.reload(backend, &stale)?;
        let retired = std::mem::replace(self, next);
        backend.release(retired.into_program());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records every link and release; programs are sequential ids.
    #[derive(Default)]
    struct CountingBackend {
        links: u32,
        released: Vec<u32>,
        reject: Option<Stage>,
    }

    impl ShaderBackend for CountingBackend {
        type Program = u32;

        fn link(&mut self, stages: &ShaderStages) -> Result<u32, ShaderError> {
            if let Some(stage) = self.reject {
                let path = match stage {
                    Stage::Vertex => stages.vertex.path.clone(),
                    Stage::Fragment => stages.fragment.path.clone(),
                };
                return Err(ShaderError::Compile {
                    stage,
                    path,
                    log: "syntax error".into(),
                });
            }
            self.links += 1;
            Ok(self.links)
        }

        fn release(&mut self, program: u32) {
            self.released.push(program);
        }
    }

    struct Sources {
        _dir: TempDir,
        vert: PathBuf,
        frag: PathBuf,
    }

    fn base_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn write_with_mtime(path: &Path, text: &str, modified: SystemTime) {
        let mut file = File::create(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.set_modified(modified).unwrap();
    }

    fn sources() -> Sources {
        let dir = TempDir::new().unwrap();
        let vert = dir.path().join("test.vert.wgsl");
        let frag = dir.path().join("test.frag.wgsl");
        write_with_mtime(&vert, "// vertex", base_time());
        write_with_mtime(&frag, "// fragment", base_time());
        Sources {
            _dir: dir,
            vert,
            frag,
        }
    }

    #[test]
    fn load_records_modification_times() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();
        assert_eq!(*shader.program(), 1);
        assert_eq!(shader.vertex().modified(), base_time());
        assert_eq!(shader.fragment().modified(), base_time());
        assert_eq!(shader.poll().unwrap(), None);
    }

    #[test]
    fn modified_source_reloads_exactly_once() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let mut shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();

        let later = base_time() + Duration::from_secs(5);
        write_with_mtime(&src.frag, "// fragment v2", later);

        assert!(shader.refresh(&mut backend).unwrap());
        assert_eq!(backend.links, 2);
        assert_eq!(backend.released, vec![1]);
        assert_eq!(*shader.program(), 2);
        assert_eq!(shader.fragment().modified(), later);
        assert_eq!(shader.vertex().modified(), base_time());

        assert!(!shader.refresh(&mut backend).unwrap());
        assert_eq!(backend.links, 2);
        assert_eq!(backend.released, vec![1]);
    }

    #[test]
    fn poll_reports_each_changed_stage() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();

        let later = base_time() + Duration::from_secs(1);
        write_with_mtime(&src.vert, "// vertex v2", later);
        let stale = shader.poll().unwrap().unwrap();
        assert_eq!(stale.vertex, Some(later));
        assert_eq!(stale.fragment, None);
    }

    #[test]
    fn reload_leaves_original_untouched() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();

        let later = base_time() + Duration::from_secs(3);
        write_with_mtime(&src.vert, "// vertex v2", later);
        let stale = shader.poll().unwrap().unwrap();
        let next = shader.reload(&mut backend, &stale).unwrap();

        assert_eq!(*shader.program(), 1);
        assert_eq!(shader.vertex().modified(), base_time());
        assert_eq!(*next.program(), 2);
        assert_eq!(next.vertex().modified(), later);
    }

    #[test]
    fn older_timestamp_also_counts_as_change() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let mut shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();

        write_with_mtime(&src.vert, "// restored", base_time() - Duration::from_secs(60));
        assert!(shader.refresh(&mut backend).unwrap());
        assert_eq!(backend.links, 2);
    }

    #[test]
    fn compile_failure_on_reload_is_reported() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let mut shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();

        write_with_mtime(&src.frag, "broken", base_time() + Duration::from_secs(1));
        backend.reject = Some(Stage::Fragment);
        let err = shader.refresh(&mut backend).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: Stage::Fragment, .. }));
        assert!(err.to_string().contains("syntax error"));
        assert!(backend.released.is_empty());
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let missing = src.vert.with_file_name("missing.vert.wgsl");
        let err = ShaderProgram::load(&mut backend, &missing, &src.frag).unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
        assert_eq!(backend.links, 0);
    }

    #[test]
    fn deleted_source_fails_the_poll() {
        let src = sources();
        let mut backend = CountingBackend::default();
        let shader = ShaderProgram::load(&mut backend, &src.vert, &src.frag).unwrap();
        std::fs::remove_file(&src.frag).unwrap();
        assert!(matches!(shader.poll(), Err(ShaderError::Io { .. })));
    }
}
