pub mod analyze_video_use_case;
pub mod infrastructure;
pub mod pipeline_executor;
pub mod pipeline_logger;
