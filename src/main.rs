mod audio;
mod config;
mod dispatch;
mod error;
mod importer;
mod library;
mod metadata;
mod playback;
mod playlist;
mod runtime;

#[cfg(test)]
mod test_support;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
