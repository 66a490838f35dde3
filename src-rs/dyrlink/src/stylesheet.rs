use owo_colors::Style;

pub const ERROR_COLOR: Style = Style::new().red();
pub const WARNING_COLOR: Style = Style::new().yellow();
pub const NOTE_COLOR: Style = Style::new().blue();
pub const HELP_COLOR: Style = Style::new().blue();
pub const LOCATION_ANNOTATION: Style = Style::new().blue().bold();

pub const DEVICE_TYPE: Style = Style::new().bold().underline();
pub const DEVICE_KEY: Style = Style::new().cyan().bold();
pub const DEVICE_REF: Style = Style::new().cyan();
pub const FIELD_NAME: Style = Style::new().green();
pub const ABSENT_VALUE: Style = Style::new().dimmed();

pub const MODEL_TYPE: Style = Style::new().bold();
pub const RULE_KEYWORD: Style = Style::new().magenta();
