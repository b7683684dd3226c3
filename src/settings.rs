use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::{Path, PathBuf}};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const SYSTEM_PROMPT: &str =
    "You are a helpful programming tutor who helps students practice coding interviews.";

/// User text sent with every screenshot. Answers come back in Portuguese.
pub const USER_INSTRUCTION: &str = "\
Analise a imagem que mostra um problema de programação e me ajude a resolvê-lo. \
Por favor, responda em português seguindo este formato:

1. Entendimento do problema - reformule o problema com suas palavras, de forma simples
2. Primeira abordagem - explique uma solução simples
3. Otimização - como melhorar a solução
4. Implementação - mostre o código passo a passo, detalhando cada linha e explicando o que ela faz
5. Análise de complexidade
6. Me liste possiveis melhorias e alternativas

Responda como se fosse meu tutor me ajudando a praticar para entrevistas, sempre na primeira \
pessoa, de forma simples de entender.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            max_tokens: 16384,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct UserSettings {
    model: ModelSettings,
    capture: CaptureSettings,
}

/// Bearer token for the model endpoint. `Debug` never prints the value.
#[derive(Clone, Default)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Settings read from `settings.json`. A missing or unparsable file falls back
/// to defaults; the file is never written back unless `persist` is called.
pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring invalid settings file {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data,
        })
    }

    pub fn model(&self) -> ModelSettings {
        self.data.model.clone()
    }

    pub fn capture(&self) -> CaptureSettings {
        self.data.capture
    }

    /// Writes the effective settings so users have a file to edit.
    pub fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// Creates the prompt file when it is absent. Analysis refuses to run without
/// a readable prompt file; its contents are not sent.
pub fn ensure_prompt_template(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, USER_INSTRUCTION)
        .with_context(|| format!("Failed to write default prompt to {}", path.display()))
}
