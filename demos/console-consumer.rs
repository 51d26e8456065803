#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate pretty_env_logger;
extern crate getopts;

extern crate kafka_client;

use std::env;
use std::path::Path;
use std::process;

use getopts::Options;

use kafka_client::{ClientBuilder, Consumer, KafkaClient};

const DEFAULT_BROKER: &str = "127.0.0.1:9092";
const DEFAULT_CLIENT_ID: &str = "console-consumer-1";
const DEFAULT_TOPIC: &str = "my-topic";

error_chain!{
    links {
        KafkaError(kafka_client::Error, kafka_client::ErrorKind);
    }
    foreign_links {
        ArgError(::getopts::Fail);
    }
}

#[derive(Clone, Debug)]
struct Config {
    brokers: Vec<String>,
    client_id: String,
    topic: String,
    partition: i32,
    group_id: String,
    no_commit: bool,
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
        opts.optopt("g", "group-id", "Specify the consumer group.", "NAME");
        opts.optopt("t", "topic", "Specify the topic.", "NAME");
        opts.optopt("p", "partition", "Specify the partition.", "N");
        opts.optflag("", "no-commit", "Do not commit group offsets.");

        let m = opts.parse(&args[1..])?;

        if m.opt_present("h") {
            let brief = format!("Usage: {} [options]", program);
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
               group_id: m.opt_str("g").unwrap_or_else(|| "console-consumer".to_owned()),
               no_commit: m.opt_present("no-commit"),
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

    let mut consumer = Consumer::new(client);

    let mut offset = consumer.offset_earliest(&config.topic, config.partition)?;

    loop {
        let messages = consumer.fetch(&config.topic, config.partition, offset, 1_000_000)?;
        if messages.is_empty() {
            break;
        }

        for message in &messages {
            info!("offset={} key={:?} value={:?}", message.offset, message.key, message.value);
            offset = message.next_offset;
        }

        if !config.no_commit {
            consumer.commit_offset(&config.group_id, &config.topic, config.partition, offset, None)?;
        }
    }

    Ok(())
}
