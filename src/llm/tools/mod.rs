pub mod csv_search_tool;
pub mod current_datetime_tool;
mod tool;

pub use csv_search_tool::CsvSearchTool;
pub use current_datetime_tool::{CurrentDateTimeTool, TimeSnapshot};
pub use tool::{FunctionDescriptor, LlmTool, ToolDescriptor};
