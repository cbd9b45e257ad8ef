//! Known-answer tests against the RFC 9497 `P256-SHA256` vectors.

mod common;

use common::TestRng;
use oprf_p256::{Input, Mode, client::Client, server::Server};

const SEED: &str = "a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3a3";
const KEY_INFO: &[u8] = b"test key";

fn seed() -> [u8; 32] {
    const_hex::decode_to_array(SEED).unwrap()
}

fn bytes(hex: &str) -> Vec<u8> {
    const_hex::decode(hex).unwrap()
}

fn key_info() -> Input<'static> {
    Input::try_from(KEY_INFO).unwrap()
}

#[test]
fn base_mode() {
    let server = Server::derive(Mode::Base, &seed(), key_info()).unwrap();
    assert_eq!(
        server.export_secret_key().as_slice(),
        bytes("159749d750713afe245d2d39ccfaae8381c53ce92d098a9375ee70739c7ac0bf"),
    );

    let vectors = [
        (
            "00",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "03723a1e5c09b8b9c18d1dcbca29e8007e95f14f4732d9346d490ffc195110368d",
            "030de02ffec47a1fd53efcdd1c6faf5bdc270912b8749e783c7ca75bb412958832",
            "a0b34de5fa4c5b6da07e72af73cc507cceeb48981b97b7285fc375345fe495dd",
        ),
        (
            "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "03cc1df781f1c2240a64d1c297b3f3d16262ef5d4cf102734882675c26231b0838",
            "03a0395fe3828f2476ffcd1f4fe540e5a8489322d398be3c4e5a869db7fcb7c52c",
            "c748ca6dd327f0ce85f4ae3a8cd6d4d5390bbb804c9e12dcf94f853fece3dcce",
        ),
    ];

    for (input_hex, blind_hex, blinded_hex, evaluated_hex, output_hex) in vectors {
        let input = bytes(input_hex);
        let blind = bytes(blind_hex);
        let inputs = [Input::try_from(input.as_slice()).unwrap()];

        let mut rng = TestRng::new(&[blind.as_slice()]);
        let (client, blinded) = Client::blind(&inputs, &mut rng).unwrap();
        assert_eq!(blinded[0].to_bytes().as_slice(), bytes(blinded_hex));

        let evaluation = server.evaluate(&blinded[0], &mut rng).unwrap();
        assert_eq!(
            evaluation.evaluated.to_bytes().as_slice(),
            bytes(evaluated_hex),
        );
        assert!(evaluation.proof.is_none());

        let outputs = client.finalize(&[evaluation.evaluated], None).unwrap();
        assert_eq!(outputs[0].as_slice(), bytes(output_hex));
    }
}

#[test]
fn verifiable_mode() {
    let server = Server::derive(Mode::Verifiable, &seed(), key_info()).unwrap();
    assert_eq!(
        server.export_secret_key().as_slice(),
        bytes("ca5d94c8807817669a51b196c34c1b7f8442fde4334a7121ae4736364312fca6"),
    );
    assert_eq!(
        server.public_key_bytes().as_slice(),
        bytes("03e17e70604bcabe198882c0a1f27a92441e774224ed9c702e51dd17038b102462"),
    );

    let vectors = [
        (
            "00",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "02dd05901038bb31a6fae01828fd8d0e49e35a486b5c5d4b4994013648c01277da",
            "0209f33cab60cf8fe69239b0afbcfcd261af4c1c5632624f2e9ba29b90ae83e4a2",
            "f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1",
            "e7c2b3c5c954c035949f1f74e6bce2ed539a3be267d1481e9ddb178533df4c2664f69d065c604a4fd953e100b856ad83804eb3845189babfa5a702090d6fc5fa",
            "0412e8f78b02c415ab3a288e228978376f99927767ff37c5718d420010a645a1",
        ),
        (
            "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "03cd0f033e791c4d79dfa9c6ed750f2ac009ec46cd4195ca6fd3800d1e9b887dbd",
            "030d2985865c693bf7af47ba4d3a3813176576383d19aff003ef7b0784a0d83cf1",
            "f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1",
            "2787d729c57e3d9512d3aa9e8708ad226bc48e0f1750b0767aaff73482c44b8d2873d74ec88aebd3504961acea16790a05c542d9fbff4fe269a77510db00abab",
            "771e10dcd6bcd3664e23b8f2a710cfaaa8357747c4a8cbba03133967b5c24f18",
        ),
    ];

    for (input_hex, blind_hex, blinded_hex, evaluated_hex, nonce_hex, proof_hex, output_hex) in
        vectors
    {
        let input = bytes(input_hex);
        let blind = bytes(blind_hex);
        let nonce = bytes(nonce_hex);
        let inputs = [Input::try_from(input.as_slice()).unwrap()];

        let mut rng = TestRng::new(&[blind.as_slice()]);
        let (client, blinded) =
            Client::blind_verifiable(&inputs, server.public_key(), &mut rng).unwrap();
        assert_eq!(blinded[0].to_bytes().as_slice(), bytes(blinded_hex));

        let mut rng = TestRng::new(&[nonce.as_slice()]);
        let evaluation = server.evaluate(&blinded[0], &mut rng).unwrap();
        assert_eq!(
            evaluation.evaluated.to_bytes().as_slice(),
            bytes(evaluated_hex),
        );
        let proof = evaluation.proof.unwrap();
        assert_eq!(proof.to_bytes().as_slice(), bytes(proof_hex));
        assert_eq!(evaluation.public_key, server.public_key());

        let outputs = client
            .finalize(&[evaluation.evaluated], Some(&proof))
            .unwrap();
        assert_eq!(outputs[0].as_slice(), bytes(output_hex));
    }
}

#[test]
fn verifiable_mode_batched() {
    let server = Server::derive(Mode::Verifiable, &seed(), key_info()).unwrap();

    let inputs_hex = ["00", "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"];
    let blinds = [
        bytes("3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364"),
        bytes("f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1"),
    ];
    let blinded_hex = [
        "02dd05901038bb31a6fae01828fd8d0e49e35a486b5c5d4b4994013648c01277da",
        "03462e9ae64cae5b83ba98a6b360d942266389ac369b923eb3d557213b1922f8ab",
    ];
    let evaluated_hex = [
        "0209f33cab60cf8fe69239b0afbcfcd261af4c1c5632624f2e9ba29b90ae83e4a2",
        "02bb24f4d838414aef052a8f044a6771230ca69c0a5677540fff738dd31bb69771",
    ];
    let outputs_hex = [
        "0412e8f78b02c415ab3a288e228978376f99927767ff37c5718d420010a645a1",
        "771e10dcd6bcd3664e23b8f2a710cfaaa8357747c4a8cbba03133967b5c24f18",
    ];
    let nonce = bytes("350e8040f828bf6ceca27405420cdf3d63cb3aef005f40ba51943c8026877963");
    let proof_hex = "bdcc351707d02a72ce49511c7db990566d29d6153ad6f8982fad2b435d6ce4d60da1e6b3fa740811bde34dd4fe0aa1b5fe6600d0440c9ddee95ea7fad7a60cf2";

    let inputs_bytes = inputs_hex.map(bytes);
    let inputs: Vec<Input<'_>> = inputs_bytes
        .iter()
        .map(|input| Input::try_from(input.as_slice()).unwrap())
        .collect();

    let mut rng = TestRng::new(&[blinds[0].as_slice(), blinds[1].as_slice()]);
    let (client, blinded) =
        Client::blind_verifiable(&inputs, server.public_key(), &mut rng).unwrap();
    for (element, expected) in blinded.iter().zip(blinded_hex) {
        assert_eq!(element.to_bytes().as_slice(), bytes(expected));
    }

    let mut rng = TestRng::new(&[nonce.as_slice()]);
    let batch = server.evaluate_batch(&blinded, &mut rng).unwrap();
    for (element, expected) in batch.evaluated.iter().zip(evaluated_hex) {
        assert_eq!(element.to_bytes().as_slice(), bytes(expected));
    }
    let proof = batch.proof.unwrap();
    assert_eq!(proof.to_bytes().as_slice(), bytes(proof_hex));

    let outputs = client.finalize(&batch.evaluated, Some(&proof)).unwrap();
    for (output, expected) in outputs.iter().zip(outputs_hex) {
        assert_eq!(output.as_slice(), bytes(expected));
    }
}

#[test]
fn partial_mode() {
    let server = Server::derive(Mode::Partial, &seed(), key_info()).unwrap();
    assert_eq!(
        server.export_secret_key().as_slice(),
        bytes("6ad2173efa689ef2c27772566ad7ff6e2d59b3b196f00219451fb2c89ee4dae2"),
    );
    assert_eq!(
        server.public_key_bytes().as_slice(),
        bytes("030d7ff077fddeec965db14b794f0cc1ba9019b04a2f4fcc1fa525dedf72e2a3e3"),
    );

    let info_bytes = b"test info";
    let info = Input::try_from(info_bytes.as_slice()).unwrap();

    let vectors = [
        (
            "00",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "031563e127099a8f61ed51eeede05d747a8da2be329b40ba1f0db0b2bd9dd4e2c0",
            "02c5e5300c2d9e6ba7f3f4ad60500ad93a0157e6288eb04b67e125db024a2c74d2",
            "f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1",
            "f8a33690b87736c854eadfcaab58a59b8d9c03b569110b6f31f8bf7577f3fbb85a8a0c38468ccde1ba942be501654adb106167c8eb178703ccb42bccffb9231a",
            "193a92520bd8fd1f37accb918040a57108daa110dc4f659abe212636d245c592",
        ),
        (
            "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
            "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364",
            "021a440ace8ca667f261c10ac7686adc66a12be31e3520fca317643a1eee9dcd4d",
            "0208ca109cbae44f4774fc0bdd2783efdcb868cb4523d52196f700210e777c5de3",
            "f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1",
            "043a8fb7fc7fd31e35770cabda4753c5bf0ecc1e88c68d7d35a62bf2631e875af4613641be2d1875c31d1319d191c4bbc0d04875f4fd03c31d3d17dd8e069b69",
            "1e6d164cfd835d88a31401623549bf6b9b306628ef03a7962921d62bc5ffce8c",
        ),
    ];

    for (input_hex, blind_hex, blinded_hex, evaluated_hex, nonce_hex, proof_hex, output_hex) in
        vectors
    {
        let input = bytes(input_hex);
        let blind = bytes(blind_hex);
        let nonce = bytes(nonce_hex);
        let inputs = [Input::try_from(input.as_slice()).unwrap()];

        let mut rng = TestRng::new(&[blind.as_slice()]);
        let (client, blinded) =
            Client::blind_partial(&inputs, info, server.public_key(), &mut rng).unwrap();
        assert_eq!(blinded[0].to_bytes().as_slice(), bytes(blinded_hex));

        let mut rng = TestRng::new(&[nonce.as_slice()]);
        let evaluation = server
            .evaluate_with_info(&blinded[0], info, &mut rng)
            .unwrap();
        assert_eq!(
            evaluation.evaluated.to_bytes().as_slice(),
            bytes(evaluated_hex),
        );
        let proof = evaluation.proof.unwrap();
        assert_eq!(proof.to_bytes().as_slice(), bytes(proof_hex));
        // The exposed key is the tweaked key, not the server key.
        assert_ne!(evaluation.public_key, server.public_key());

        let outputs = client
            .finalize(&[evaluation.evaluated], Some(&proof))
            .unwrap();
        assert_eq!(outputs[0].as_slice(), bytes(output_hex));
    }
}

#[test]
fn partial_mode_batched() {
    let server = Server::derive(Mode::Partial, &seed(), key_info()).unwrap();
    let info = Input::try_from(b"test info".as_slice()).unwrap();

    let inputs_hex = ["00", "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"];
    let blinds = [
        bytes("3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364"),
        bytes("f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1"),
    ];
    let blinded_hex = [
        "031563e127099a8f61ed51eeede05d747a8da2be329b40ba1f0db0b2bd9dd4e2c0",
        "03ca4ff41c12fadd7a0bc92cf856732b21df652e01a3abdf0fa8847da053db213c",
    ];
    let evaluated_hex = [
        "02c5e5300c2d9e6ba7f3f4ad60500ad93a0157e6288eb04b67e125db024a2c74d2",
        "02f0b6bcd467343a8d8555a99dc2eed0215c71898c5edb77a3d97ddd0dbad478e8",
    ];
    let outputs_hex = [
        "193a92520bd8fd1f37accb918040a57108daa110dc4f659abe212636d245c592",
        "1e6d164cfd835d88a31401623549bf6b9b306628ef03a7962921d62bc5ffce8c",
    ];
    let nonce = bytes("350e8040f828bf6ceca27405420cdf3d63cb3aef005f40ba51943c8026877963");
    let proof_hex = "8fbd85a32c13aba79db4b42e762c00687d6dbf9c8cb97b2a225645ccb00d9d7580b383c885cdfd07df448d55e06f50f6173405eee5506c0ed0851ff718d13e68";

    let inputs_bytes = inputs_hex.map(bytes);
    let inputs: Vec<Input<'_>> = inputs_bytes
        .iter()
        .map(|input| Input::try_from(input.as_slice()).unwrap())
        .collect();

    let mut rng = TestRng::new(&[blinds[0].as_slice(), blinds[1].as_slice()]);
    let (client, blinded) =
        Client::blind_partial(&inputs, info, server.public_key(), &mut rng).unwrap();
    for (element, expected) in blinded.iter().zip(blinded_hex) {
        assert_eq!(element.to_bytes().as_slice(), bytes(expected));
    }

    let mut rng = TestRng::new(&[nonce.as_slice()]);
    let batch = server
        .evaluate_batch_with_info(&blinded, info, &mut rng)
        .unwrap();
    for (element, expected) in batch.evaluated.iter().zip(evaluated_hex) {
        assert_eq!(element.to_bytes().as_slice(), bytes(expected));
    }
    let proof = batch.proof.unwrap();
    assert_eq!(proof.to_bytes().as_slice(), bytes(proof_hex));

    let outputs = client.finalize(&batch.evaluated, Some(&proof)).unwrap();
    for (output, expected) in outputs.iter().zip(outputs_hex) {
        assert_eq!(output.as_slice(), bytes(expected));
    }
}
