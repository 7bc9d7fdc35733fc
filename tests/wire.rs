//! Wire format tests against hand-captured packets.

use querist::base::rdata::{RecordData, Srv, A};
use querist::base::{Class, Message, Name, Question, Record, Rtype};
use std::str::FromStr;

/// A response for `dns.google IN A` the way a real resolver sends it:
/// compressed answer owners, two answers.
const GOOGLE_RESPONSE: &[u8] =
    b"\x12\x34\x81\x80\x00\x01\x00\x02\x00\x00\x00\x00\
      \x03dns\x06google\x00\x00\x01\x00\x01\
      \xc0\x0c\x00\x01\x00\x01\x00\x00\x03\x84\x00\x04\x08\x08\x08\x08\
      \xc0\x0c\x00\x01\x00\x01\x00\x00\x03\x84\x00\x04\x08\x08\x04\x04";

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

#[test]
fn decode_captured_response() {
    let msg = Message::parse(GOOGLE_RESPONSE).unwrap();

    let header = msg.header();
    assert_eq!(header.id(), 0x1234);
    assert!(header.qr());
    assert!(header.rd());
    assert!(header.ra());

    assert_eq!(msg.questions().len(), 1);
    let question = msg.first_question().unwrap();
    assert_eq!(*question.qname(), name("dns.google"));
    assert_eq!(question.qtype(), Rtype::A);
    assert_eq!(question.qclass(), Class::In);

    assert_eq!(msg.answers().len(), 2);
    for record in msg.answers() {
        assert_eq!(*record.owner(), name("dns.google"));
        assert_eq!(record.ttl(), 900);
    }
    let addrs: Vec<String> = msg
        .answers()
        .iter()
        .map(|record| record.data().to_string())
        .collect();
    assert_eq!(addrs, ["8.8.8.8", "8.8.4.4"]);
}

#[test]
fn reencode_captured_response() {
    let msg = Message::parse(GOOGLE_RESPONSE).unwrap();
    let octets = msg.compose().unwrap();
    // Compressing the answer owners against the question name happens to
    // be exactly what the captured packet does.
    assert_eq!(octets.as_ref(), GOOGLE_RESPONSE);
    assert_eq!(Message::parse(&octets).unwrap(), msg);
}

#[test]
fn pointer_cycle_is_rejected() {
    // The question name at position 12 is a label followed by a pointer
    // back to position 12.
    let packet = b"\x00\x00\x80\x00\x00\x01\x00\x00\x00\x00\x00\x00\
                   \x01a\xc0\x0c\x00\x01\x00\x01";
    assert!(Message::parse(packet).is_err());
}

#[test]
fn forward_pointer_is_rejected() {
    // The question name is a pointer to data following it.
    let packet = b"\x00\x00\x80\x00\x00\x01\x00\x00\x00\x00\x00\x00\
                   \xc0\x0e\x03dns\x00\x00\x01\x00\x01";
    assert!(Message::parse(packet).is_err());
}

#[test]
fn srv_round_trip() {
    let mut msg = Message::query(Question::new_in(
        name("_mongodb._tcp.example.com"),
        Rtype::Srv,
    ));
    msg.header_mut().set_id(7);
    msg.header_mut().set_qr(true);
    msg.push_answer(Record::new(
        name("_mongodb._tcp.example.com"),
        Class::In,
        120,
        RecordData::Srv(Srv::new(0, 5, 27017, name("db1.example.com"))),
    ));
    msg.push_answer(Record::new(
        name("_mongodb._tcp.example.com"),
        Class::In,
        120,
        RecordData::Srv(Srv::new(1, 10, 27018, name("db2.example.com"))),
    ));

    let parsed = Message::parse(&msg.compose().unwrap()).unwrap();
    assert_eq!(parsed, msg);
    let srv: Vec<&Srv> = parsed
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RecordData::Srv(srv) => Some(srv),
            _ => None,
        })
        .collect();
    assert_eq!(srv.len(), 2);
    assert_eq!(
        (srv[0].priority(), srv[0].weight(), srv[0].port()),
        (0, 5, 27017)
    );
    assert_eq!(*srv[1].target(), name("db2.example.com"));
}

#[test]
fn mixed_sections_round_trip() {
    let mut msg = Message::query(Question::new_in(
        name("example.org"),
        Rtype::Any,
    ));
    msg.header_mut().set_id(0xfefe);
    msg.header_mut().set_qr(true);
    msg.push_answer(Record::new(
        name("example.org"),
        Class::In,
        60,
        RecordData::A(A::new("192.0.2.80".parse().unwrap())),
    ));
    msg.push_authority(Record::new(
        name("example.org"),
        Class::In,
        3600,
        RecordData::Ns(querist::base::rdata::Ns::new(name(
            "ns1.example.org",
        ))),
    ));
    msg.push_additional(Record::new(
        name("ns1.example.org"),
        Class::In,
        3600,
        RecordData::A(A::new("192.0.2.53".parse().unwrap())),
    ));

    let octets = msg.compose().unwrap();
    let parsed = Message::parse(&octets).unwrap();
    assert_eq!(parsed, msg);
    assert_eq!(parsed.answers().len(), 1);
    assert_eq!(parsed.authorities().len(), 1);
    assert_eq!(parsed.additionals().len(), 1);
}

#[test]
fn decoded_aaaa_renders_expanded() {
    // A response for `dns.google IN AAAA` with the answer's address in
    // raw wire form.
    let packet = b"\x00\x42\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
                   \x03dns\x06google\x00\x00\x1c\x00\x01\
                   \xc0\x0c\x00\x1c\x00\x01\x00\x00\x01\x2c\x00\x10\
                   \x2a\x00\x14\x50\x40\x01\x08\x09\
                   \x00\x00\x00\x00\x00\x00\x20\x0e";
    let msg = Message::parse(packet).unwrap();
    // The string form a caller sees is the fully zero-padded one.
    assert_eq!(
        msg.answers()[0].data().to_string(),
        "2a00:1450:4001:0809:0000:0000:0000:200e"
    );
    match msg.answers()[0].data() {
        RecordData::Aaaa(aaaa) => assert_eq!(
            aaaa.to_string(),
            "2a00:1450:4001:0809:0000:0000:0000:200e"
        ),
        _ => panic!("expected AAAA"),
    }
}

#[test]
fn decoded_ptr_renders_qualified() {
    // A response for `4.4.8.8.in-addr.arpa IN PTR` pointing at
    // `dns.google`.
    let packet = b"\x00\x42\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
                   \x014\x014\x018\x018\x07in-addr\x04arpa\x00\
                   \x00\x0c\x00\x01\
                   \xc0\x0c\x00\x0c\x00\x01\x00\x00\x03\x84\x00\x0c\
                   \x03dns\x06google\x00";
    let msg = Message::parse(packet).unwrap();
    match msg.answers()[0].data() {
        RecordData::Ptr(ptr) => {
            assert_eq!(ptr.to_string(), "PTRRecord: dns.google");
            assert_eq!(ptr.ptrdname().to_string(), "dns.google");
        }
        _ => panic!("expected PTR"),
    }
    // Record-level presentation keeps the bare target name.
    assert_eq!(
        msg.answers()[0].to_string(),
        "4.4.8.8.in-addr.arpa 900 IN PTR dns.google"
    );
}

#[test]
fn txt_packet_attributes() {
    let mut msg = Message::query(Question::new_in(
        name("example.com"),
        Rtype::Txt,
    ));
    msg.header_mut().set_qr(true);
    msg.push_answer(Record::new(
        name("example.com"),
        Class::In,
        300,
        RecordData::Txt(
            querist::base::rdata::Txt::from_entries(vec![
                b"v=spf1 -all".to_vec(),
                b"standalone".to_vec(),
            ])
            .unwrap(),
        ),
    ));

    let parsed = Message::parse(&msg.compose().unwrap()).unwrap();
    let txt = match parsed.answers()[0].data() {
        RecordData::Txt(txt) => txt,
        _ => panic!("expected TXT"),
    };
    assert_eq!(txt.entries().len(), 2);
    assert_eq!(txt.attributes()["v"], "spf1 -all");
}
