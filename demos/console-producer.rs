#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate pretty_env_logger;
extern crate getopts;

extern crate kafka_client;

use std::env;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;

use getopts::Options;

use kafka_client::{ClientBuilder, Compression, KafkaClient, Producer, ProducerRecord};

const DEFAULT_BROKER: &str = "127.0.0.1:9092";
const DEFAULT_CLIENT_ID: &str = "console-producer-1";
const DEFAULT_TOPIC: &str = "my-topic";

error_chain!{
    links {
        KafkaError(kafka_client::Error, kafka_client::ErrorKind);
    }
    foreign_links {
        IoError(::std::io::Error);
        ArgError(::getopts::Fail);
    }
}

#[derive(Clone, Debug)]
struct Config {
    brokers: Vec<String>,
    client_id: String,
    topic: String,
    partition: i32,
    required_acks: i16,
}

impl Config {
    fn parse_cmdline() -> Result<Config> {
        let args: Vec<String> = env::args().collect();
        let program = Path::new(&args[0]).file_name().unwrap().to_str().unwrap();
        let mut opts = Options::new();

        opts.optflag("h", "help", "print this help menu");
        opts.optopt("b",
                    "bootstrap-server",
                    "Bootstrap broker(s) (host:port, comma separated)",
                    "HOSTS");
        opts.optopt("", "client-id", "Specify the client id.", "ID");
        opts.optopt("t", "topic", "Specify the topic.", "NAME");
        opts.optopt("p", "partition", "Specify the partition.", "N");
        opts.optopt("", "required-acks", "0, 1 or -1.", "N");

        let m = opts.parse(&args[1..])?;

        if m.opt_present("h") {
            let brief = format!("Usage: {} [options] < messages.txt", program);
            print!("{}", opts.usage(&brief));
            process::exit(0);
        }

        let brokers = m.opt_str("b")
            .map_or_else(|| vec![DEFAULT_BROKER.to_owned()],
                         |s| s.split(',').map(|s| s.trim().to_owned()).collect());

        Ok(Config {
               brokers: brokers,
               client_id: m.opt_str("client-id").unwrap_or_else(|| DEFAULT_CLIENT_ID.to_owned()),
               topic: m.opt_str("t").unwrap_or_else(|| DEFAULT_TOPIC.to_owned()),
               partition: m.opt_str("p").and_then(|s| s.parse().ok()).unwrap_or(0),
               required_acks: m.opt_str("required-acks").and_then(|s| s.parse().ok()).unwrap_or(1),
           })
    }
}

fn main() {
    pretty_env_logger::init().unwrap();

    let config = Config::parse_cmdline().unwrap();
    debug!("parsed config: {:?}", config);

    run(config).unwrap();
}

fn run(config: Config) -> Result<()> {
    let client_config = ClientBuilder::new()
        .broker_list(config.brokers)
        .client_id(config.client_id)
        .build();
    let client = KafkaClient::from_config(client_config)?;

    let mut producer = Producer::new(client);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let record = ProducerRecord::from_value(line.into_bytes());
        let result = producer.produce(&config.topic,
                          config.partition,
                          vec![record],
                          config.required_acks,
                          1500,
                          Compression::None)?;
        info!("produced at offset {}", result.offset);
    }

    Ok(())
}
