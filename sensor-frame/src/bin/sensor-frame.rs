use std::{error::Error as StdError, process};

use clap::{Arg as ClapArg, ArgMatches, Command, value_parser};

use sensor_frame::libs::{
    SensorReading, am2320,
    frame::{DEF_KEY, SensorFrame},
};

const PROJ_NAME: &'static str = env!("CARGO_PKG_NAME");
const PROJ_VER: &'static str = env!("CARGO_PKG_VERSION");

fn main() {
    let args = Command::new(PROJ_NAME)
        .version(PROJ_VER)
        .subcommand_required(true)
        .subcommand(
            Command::new("encode")
                .about("Encode one reading into frame text")
                .arg(device_id_arg())
                .arg(
                    ClapArg::new("temperature")
                        .long("temperature")
                        .help("temperature in 0.1 Celsius")
                        .num_args(1)
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i16)),
                )
                .arg(
                    ClapArg::new("humidity")
                        .long("humidity")
                        .help("humidity in 0.1%")
                        .num_args(1)
                        .required(true)
                        .value_parser(value_parser!(u16)),
                )
                .arg(key_arg()),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode frame text and print the reading as JSON")
                .arg(
                    ClapArg::new("text")
                        .help("27 characters of base64url")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("am2320")
                .about("Encode an AM2320 register response given in hexadecimal")
                .arg(device_id_arg())
                .arg(key_arg())
                .arg(
                    ClapArg::new("response")
                        .help("8 bytes response such as `0304026400eb....`")
                        .required(true),
                ),
        )
        .get_matches();

    let result = match args.subcommand() {
        Some(("encode", sub)) => run_encode(sub),
        Some(("decode", sub)) => run_decode(sub),
        Some(("am2320", sub)) => run_am2320(sub),
        _ => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn device_id_arg() -> ClapArg {
    ClapArg::new("device-id")
        .long("device-id")
        .help("device ID")
        .num_args(1)
        .required(true)
        .value_parser(value_parser!(u16))
}

fn key_arg() -> ClapArg {
    ClapArg::new("key")
        .long("key")
        .help("obfuscation key, 0 to disable masking")
        .num_args(1)
        .value_parser(value_parser!(u16))
}

fn frame_key(args: &ArgMatches) -> u16 {
    match args.get_one::<u16>("key") {
        None => DEF_KEY,
        Some(key) => *key,
    }
}

fn run_encode(args: &ArgMatches) -> Result<(), Box<dyn StdError>> {
    let reading = SensorReading::new(
        *args.get_one::<u16>("device-id").ok_or("missing device ID")?,
        *args.get_one::<i16>("temperature").ok_or("missing temperature")?,
        *args.get_one::<u16>("humidity").ok_or("missing humidity")?,
    );
    println!("{}", SensorFrame::with_key(reading, frame_key(args)).encode());
    Ok(())
}

fn run_decode(args: &ArgMatches) -> Result<(), Box<dyn StdError>> {
    let text = args.get_one::<String>("text").ok_or("missing text")?;
    let frame = SensorFrame::decode(text.as_str())?;
    println!("{}", serde_json::to_string(&frame.reading)?);
    Ok(())
}

fn run_am2320(args: &ArgMatches) -> Result<(), Box<dyn StdError>> {
    let device_id = *args.get_one::<u16>("device-id").ok_or("missing device ID")?;
    let resp = args.get_one::<String>("response").ok_or("missing response")?;
    let data = hex::decode(resp.as_str())?;
    let reading = am2320::parse_response(data.as_slice())?.into_reading(device_id);
    println!("{}", SensorFrame::with_key(reading, frame_key(args)).encode());
    Ok(())
}
