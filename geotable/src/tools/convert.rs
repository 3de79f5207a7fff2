use anyhow::Result;
use geotable_core::progress::get_progress_bar;
use geotable_geojson::{MemoryTable, read_geojson_file, write_geojson_file};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// supported formats: *.geojson, *.json and their .gz variants
	#[arg()]
	input_file: PathBuf,

	/// supported formats: *.geojson, *.json and their .gz variants
	#[arg()]
	output_file: PathBuf,

	/// overwrite the output file if it exists
	#[arg(long, short)]
	force: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!(
		"convert from {:?} to {:?}",
		arguments.input_file, arguments.output_file
	);

	let mut table = MemoryTable::new();
	let progress = get_progress_bar();
	let report = read_geojson_file(&arguments.input_file, &mut table, progress.as_ref())?;
	eprintln!("imported {} features", report.feature_count);

	write_geojson_file(&arguments.output_file, &mut table, arguments.force)?;

	Ok(())
}
