pub mod temp_store_frame_source;
