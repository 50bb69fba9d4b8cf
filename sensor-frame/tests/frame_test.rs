use sensor_frame::{
    FrameError, SensorFrame, SensorReading, decode, encode,
    libs::{am2320, frame::ENCODED_LEN},
};

#[test]
fn test_am2320_response_to_frame() {
    // humidity 61.2%, temperature -4.5 C
    let mut resp = vec![0x03, 0x04, 0x02, 0x64, 0x80, 0x2d];
    let crc = am2320::crc16(resp.as_slice());
    resp.extend_from_slice(&crc.to_le_bytes());

    let reading = am2320::parse_response(resp.as_slice())
        .unwrap()
        .into_reading(3);
    let text = SensorFrame::new(reading).encode();
    assert_eq!(text.len(), ENCODED_LEN);

    let decoded = decode(text.as_str()).unwrap();
    assert_eq!(decoded, SensorReading::new(3, -45, 612));
    assert_eq!(decoded.temperature_celsius(), -4.5);
    assert_eq!(decoded.humidity_percent(), 61.2);
}

#[test]
fn test_decode_keeps_key() {
    let frame = SensorFrame::with_key(SensorReading::new(100, 215, 480), 0xbeef);
    let decoded = SensorFrame::decode(frame.encode().as_str()).unwrap();
    assert_eq!(decoded.key, 0xbeef);
    assert_eq!(decoded.reading, frame.reading);
}

#[test]
fn test_keys_change_text() {
    let reading = SensorReading::new(1, 2, 3);
    let plain = SensorFrame::with_key(reading, 0).encode();
    let masked = SensorFrame::with_key(reading, 0x1234).encode();
    assert_ne!(plain, masked);
    assert_eq!(encode(1, 2, 3), masked);
}

#[test]
fn test_corrupt_text() {
    let text = encode(42, 235, 600);
    // Character 20 lies inside the hash bytes.
    let mut chars: Vec<char> = text.chars().collect();
    chars[20] = if chars[20] == 'A' { 'B' } else { 'A' };
    let corrupt: String = chars.into_iter().collect();
    assert_eq!(decode(corrupt.as_str()), Err(FrameError::Corrupt));
}

#[test]
fn test_reading_json() {
    let json = serde_json::to_string(&SensorReading::new(42, -5, 700)).unwrap();
    assert_eq!(json, r#"{"deviceId":42,"temperature":-5,"humidity":700}"#);
}
