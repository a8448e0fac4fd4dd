pub mod archive_server;
