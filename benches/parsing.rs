//! Benchmarks for IRC message parsing and outbound encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slirc_client::{ctcp, encode, Message};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Numeric response
const NUMERIC_RESPONSE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// Names-list reply with member sigils
const NAMES_REPLY: &str = ":irc.server.net 353 nickname = #channel :@op +voiced plain @+both another";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    group.bench_function("simple_ping", |b| {
        b.iter(|| {
            let msg = Message::parse(black_box(SIMPLE_MESSAGE)).unwrap();
            black_box(msg)
        })
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| {
            let msg = Message::parse(black_box(PREFIX_MESSAGE)).unwrap();
            black_box(msg)
        })
    });

    group.bench_function("numeric_response", |b| {
        b.iter(|| {
            let msg = Message::parse(black_box(NUMERIC_RESPONSE)).unwrap();
            black_box(msg)
        })
    });

    group.bench_function("names_reply", |b| {
        b.iter(|| {
            let msg = Message::parse(black_box(NAMES_REPLY)).unwrap();
            black_box(msg)
        })
    });

    group.finish();
}

fn benchmark_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Outbound Encoding");

    group.bench_function("privmsg", |b| {
        b.iter(|| {
            let line = encode::privmsg(black_box("#channel"), black_box("Hello, world!"));
            black_box(line)
        })
    });

    group.bench_function("ctcp_round_trip", |b| {
        b.iter(|| {
            let wrapped = ctcp::encode(black_box("PING"), black_box("12345"));
            let decoded = ctcp::decode(&wrapped);
            black_box(decoded)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_encoding);
criterion_main!(benches);
