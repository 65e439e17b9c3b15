use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use floodit_engine::{Color, GameSettings};

use crate::schema::ai_model::AiModel;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write newline to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    let reader = io::BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {} JSON file: {}", file_kind, path.display()))
}

pub fn read_ai_model_file<P>(path: P) -> anyhow::Result<AiModel>
where
    P: AsRef<Path>,
{
    read_json_file("AI model", path)
}

/// Settings using the first `colors` colors of the default palette.
pub fn settings_from_args(
    size: usize,
    colors: usize,
    seed: Option<u64>,
) -> anyhow::Result<GameSettings> {
    let palette = Color::DEFAULT_PALETTE;
    anyhow::ensure!(
        (2..=palette.len()).contains(&colors),
        "--colors must be between 2 and {}",
        palette.len()
    );
    Ok(GameSettings::new(size, palette[..colors].to_vec())?.with_seed(seed))
}

/// Copy of saved settings with `seed` taking precedence over the saved seed.
pub fn override_seed(saved: &GameSettings, seed: Option<u64>) -> GameSettings {
    saved.clone().with_seed(seed.or(saved.seed()))
}

/// Renders a board with one letter per palette color.
pub fn render_board(settings: &GameSettings, cells: &[Color]) -> String {
    let mut text = String::new();
    for row in cells.chunks(settings.size()) {
        for color in row {
            let index = settings.palette().iter().position(|c| c == color);
            let letter = index
                .and_then(|i| u8::try_from(i).ok())
                .and_then(|i| b'A'.checked_add(i))
                .map_or('?', char::from);
            text.push(letter);
        }
        text.push('\n');
    }
    text
}
