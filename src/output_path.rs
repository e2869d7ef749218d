//! Collision-free output naming.
//!
//! The output lands next to the source file as `<source minus extension><task suffix>.<ext>`.
//! If that name is taken we append `_1`, `_2`, … before the extension so an earlier result is
//! never overwritten.
//!
//! The existence check is not atomic: two runs racing on the same source can pick the same
//! name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::opts::Task;
use crate::output_type::OutputType;

/// Resolve the output path for `source` against the real filesystem.
pub fn resolve_output_path(source: &Path, task: Task, output_type: OutputType) -> PathBuf {
    resolve_output_path_with(source, task, output_type, |p| p.exists())
}

/// Resolve the output path using a caller-supplied existence predicate.
pub fn resolve_output_path_with(
    source: &Path,
    task: Task,
    output_type: OutputType,
    exists: impl Fn(&Path) -> bool,
) -> PathBuf {
    let mut base = source.with_extension("").into_os_string();
    base.push(task.file_suffix());
    let ext = output_type.extension();

    let candidate = join_ext(base.clone(), ext);
    if !exists(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 1;
    loop {
        let mut numbered = base.clone();
        numbered.push(format!("_{counter}"));
        let candidate = join_ext(numbered, ext);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn join_ext(mut stem: OsString, ext: &str) -> PathBuf {
    stem.push(".");
    stem.push(ext);
    PathBuf::from(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn replaces_source_extension() {
        let out = resolve_output_path_with(
            Path::new("/media/talk.mp4"),
            Task::Transcribe,
            OutputType::Srt,
            |_| false,
        );
        assert_eq!(out, PathBuf::from("/media/talk.srt"));
    }

    #[test]
    fn translate_adds_en_marker() {
        let out = resolve_output_path_with(
            Path::new("/media/talk.mkv"),
            Task::Translate,
            OutputType::Vtt,
            |_| false,
        );
        assert_eq!(out, PathBuf::from("/media/talk.en.vtt"));
    }

    #[test]
    fn numbers_collisions_in_increasing_order() {
        let taken: HashSet<PathBuf> = ["/m/a.srt", "/m/a_1.srt"].iter().map(PathBuf::from).collect();
        let out = resolve_output_path_with(Path::new("/m/a.wav"), Task::Transcribe, OutputType::Srt, |p| {
            taken.contains(p)
        });
        assert_eq!(out, PathBuf::from("/m/a_2.srt"));
    }

    #[test]
    fn numbering_goes_after_the_translate_marker() {
        let taken: HashSet<PathBuf> = ["/m/a.en.json"].iter().map(PathBuf::from).collect();
        let out = resolve_output_path_with(Path::new("/m/a.mp3"), Task::Translate, OutputType::Json, |p| {
            taken.contains(p)
        });
        assert_eq!(out, PathBuf::from("/m/a.en_1.json"));
    }

    #[test]
    fn source_without_extension() {
        let out = resolve_output_path_with(Path::new("recording"), Task::Transcribe, OutputType::Txt, |_| false);
        assert_eq!(out, PathBuf::from("recording.txt"));
    }

    #[test]
    fn skips_files_that_exist_on_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("clip.mp4");
        std::fs::write(dir.path().join("clip.srt"), "old")?;

        let first = resolve_output_path(&source, Task::Transcribe, OutputType::Srt);
        assert_eq!(first, dir.path().join("clip_1.srt"));

        std::fs::write(&first, "older")?;
        let second = resolve_output_path(&source, Task::Transcribe, OutputType::Srt);
        assert_eq!(second, dir.path().join("clip_2.srt"));
        assert!(!second.exists());
        Ok(())
    }
}
