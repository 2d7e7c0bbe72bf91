use clap::{arg, crate_version, Command};
use wisent::{pipeline::Pipeline, Options};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help =
"Examples:
---------
Build:       `wisent-cli build -i doc.json -o doc.wisent`
Compress:    `wisent-cli compress -i doc.json -o doc.wz --pipeline delta,huffman`
Decompress:  `wisent-cli decompress -i doc.wz -o doc.wisent --pipeline delta,huffman`
Dump:        `wisent-cli dump -i doc.wisent`";

    let mut main_cmd = Command::new("wisent-cli")
        .about("Build and compress Wisent trees from JSON/CSV")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("build")
            .about("parse a JSON document into a sealed Wisent tree")
            .arg(arg!(-i --input <PATH> "input JSON path").required(true))
            .arg(arg!(-o --output <PATH> "output tree path").required(true))
            .arg(arg!(--"csv-prefix" <PATH> "directory prepended to referenced .csv files").required(false))
            .arg(arg!(--"disable-rle" "skip tag-array run-length compaction").required(false))
            .arg(arg!(--"disable-csv" "treat .csv-suffixed strings as plain strings").required(false)),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("compress")
            .about("build a tree, then run it through a compression pipeline")
            .arg(arg!(-i --input <PATH> "input JSON path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .arg(arg!(-p --pipeline <STEPS> "comma-separated codec names, e.g. delta,huffman").required(true))
            .arg(arg!(--"block-size" <N> "split input into N-byte blocks (0 = one-shot)").required(false))
            .arg(arg!(--"csv-prefix" <PATH> "directory prepended to referenced .csv files").required(false))
            .arg(arg!(--"disable-rle" "skip tag-array run-length compaction").required(false))
            .arg(arg!(--"disable-csv" "treat .csv-suffixed strings as plain strings").required(false)),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("decompress")
            .about("invert a compression pipeline back to a sealed tree")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output tree path").required(true))
            .arg(arg!(-p --pipeline <STEPS> "comma-separated codec names, matching the compress step").required(true))
            .arg(arg!(--"block-size" <N> "must match the value used to compress").required(false)),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("dump")
            .about("render a sealed tree back to JSON on stdout")
            .arg(arg!(-i --input <PATH> "input tree path").required(true)),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("build") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let options = options_from(cmd);
        let input = std::fs::read(path_in)?;
        let tree = wisent::load(&input, &options)?;
        std::fs::write(path_out, tree)?;
    }

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let options = options_from(cmd);
        let pipeline = pipeline_from(cmd)?;
        pipeline.log();
        let input = std::fs::read(path_in)?;
        let compressed = wisent::compress(&input, &options, &pipeline)?;
        std::fs::write(path_out, compressed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("decompress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let pipeline = pipeline_from(cmd)?;
        pipeline.log();
        let input = std::fs::read(path_in)?;
        let tree = pipeline.decompress(&input)?;
        std::fs::write(path_out, tree)?;
    }

    if let Some(cmd) = matches.subcommand_matches("dump") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let input = std::fs::read(path_in)?;
        let tree = wisent::reader::Tree::new(&input)?;
        let json = tree.root().to_json()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(())
}

fn options_from(cmd: &clap::ArgMatches) -> Options {
    Options {
        disable_rle: cmd.get_flag("disable-rle"),
        disable_csv_handling: cmd.get_flag("disable-csv"),
        csv_prefix: cmd
            .get_one::<String>("csv-prefix")
            .map(std::path::PathBuf::from)
            .unwrap_or_default(),
        block_size: cmd
            .get_one::<String>("block-size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}

fn pipeline_from(cmd: &clap::ArgMatches) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let spec = cmd.get_one::<String>("pipeline").expect(RCH);
    let block_size: usize = cmd
        .get_one::<String>("block-size")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let mut builder = Pipeline::builder().block_size(block_size);
    for step in spec.split(',') {
        builder = builder.step(step.trim())?;
    }
    Ok(builder.build())
}
