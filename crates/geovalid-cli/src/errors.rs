use console::style;
use geovalid_core::error::Error;
use std::fmt;

/// A failure the user can act on: the error, where it happened, and what to try
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    fn from_error(error: &Error) -> Self {
        Self {
            message: error.to_string(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    /// Styled multi-line report
    pub fn render(&self) -> String {
        let mut report =
            format!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(context) = &self.context {
            report.push_str(&format!("\n{}\n", context));
        }

        if !self.suggestions.is_empty() {
            report.push_str(&format!("\n{}\n", style("To fix this:").yellow().bold()));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                report.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(help) = &self.help_command {
            report.push_str(&format!(
                "\n{} {}\n",
                style("Need help?").cyan(),
                style(help).cyan().bold()
            ));
        }
        report
    }

    pub fn display(&self) {
        eprint!("{}", self.render());
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliError")
            .field("message", &self.message)
            .field("suggestions", &self.suggestions)
            .finish()
    }
}

impl std::error::Error for CliError {}

/// Attach suggestions to library errors the user can act on
pub fn explain(error: Error) -> anyhow::Error {
    let base = CliError::from_error(&error);
    let cli_error = match error {
        Error::UnknownCriterion { category, .. } => base
            .with_suggestion(format!("Use only {} criteria for this option", category))
            .with_help("geovalid criteria"),
        Error::NoCriteriaSelected => base
            .with_suggestion("Select at least one criterion with --invalid or --problematic")
            .with_help("geovalid criteria"),
        Error::UnsupportedInput { .. } => base
            .with_suggestion("Pass a file path or URL ending in .json or .geojson"),
        Error::Fetch { ref url, .. } => base
            .with_context(format!("URL: {}", url))
            .with_suggestion("Check the URL and your network connection"),
        Error::NestingTooDeep { .. } => base
            .with_suggestion("Raise the limit with --max-depth or GEOVALID_MAX_DEPTH"),
        Error::MissingType { .. } | Error::MalformedGeometry { .. } => base
            .with_suggestion("Run 'geovalid lint' on the document to locate structural problems"),
        other => return anyhow::Error::new(other),
    };
    anyhow::Error::new(cli_error)
}
