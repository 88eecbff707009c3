pub mod concat_list;
pub mod ffmpeg;
pub mod truncate;
