// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

mod common;

use pretty_assertions::assert_eq;
use utxo_ledger::{
    ledger::{store::MemoryStore, LedgerEngine, LedgerError, OutputFilter, PageCursor},
    model::{AliasId, Confirmation, Features, FoundryId, NftId, Output, OutputKind, Tag, TokenScheme},
};

use self::common::{
    alias, basic, foundry, nft, output, rand_alias_address, rand_ed25519_address, rand_nft_address, sorted_ids, spend,
    with_features,
};

fn ledger_at(index: u32) -> LedgerEngine<MemoryStore> {
    let ledger = LedgerEngine::new(MemoryStore::new());
    ledger.store_ledger_index(index.into()).unwrap();
    ledger
}

#[test]
fn test_address_and_kind_filters() {
    let ledger = ledger_at(755);
    let address = rand_ed25519_address();

    let outputs = vec![
        output(basic(3_242_343, address), 756),
        output(basic(1, rand_ed25519_address()), 756),
        output(basic(5_898_566, address), 756), // spent
        output(basic(2, rand_ed25519_address()), 756), // spent
        output(nft(23_432_423, NftId::null(), address), 756),
        output(basic(78_632_467, address), 756),
        output(basic(3, rand_ed25519_address()), 756),
        output(alias(4, AliasId::null(), rand_ed25519_address()), 756),
        output(nft(5, NftId::null(), rand_ed25519_address()), 756),
        output(nft(6, NftId::null(), rand_ed25519_address()), 756),
        output(basic(98_734_278, address), 756),
        output(alias(98_734_278, AliasId::null(), address), 756),
    ];
    let spents = [spend(&outputs[3], 756), spend(&outputs[2], 756)];
    ledger
        .apply_confirmation(&Confirmation::new(756).with_outputs(outputs.clone()).with_spents(spents))
        .unwrap();

    let basic_on_address = ledger.load_unspent_outputs(OutputFilter::basic(Some(address))).unwrap();
    assert_eq!(
        sorted_ids(&basic_on_address),
        sorted_ids([&outputs[0], &outputs[5], &outputs[10]])
    );

    let limited = ledger
        .load_unspent_outputs(OutputFilter::basic(Some(address)).max_result_count(1))
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert!(basic_on_address.contains(&limited[0]));

    let any_on_address = ledger.load_unspent_outputs(OutputFilter::all().address(address)).unwrap();
    assert_eq!(
        sorted_ids(&any_on_address),
        sorted_ids([&outputs[0], &outputs[4], &outputs[5], &outputs[10], &outputs[11]])
    );

    let nft_on_address = ledger
        .load_unspent_outputs(OutputFilter::all().address(address).kind(OutputKind::Nft))
        .unwrap();
    assert_eq!(sorted_ids(&nft_on_address), sorted_ids([&outputs[4]]));

    let alias_on_address = ledger
        .load_unspent_outputs(OutputFilter::all().address(address).kind(OutputKind::Alias))
        .unwrap();
    assert_eq!(sorted_ids(&alias_on_address), sorted_ids([&outputs[11]]));

    assert_eq!(ledger.load_unspent_outputs(OutputFilter::basic(None)).unwrap().len(), 5);
    assert_eq!(
        ledger
            .load_unspent_outputs(OutputFilter::basic(None).max_result_count(2))
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        sorted_ids(ledger.load_spent_outputs(None).unwrap().iter().map(|s| &s.output)),
        sorted_ids([&outputs[2], &outputs[3]])
    );
    assert_eq!(ledger.load_spent_outputs(Some(1)).unwrap().len(), 1);
}

#[test]
fn test_identifier_filters() {
    let ledger = ledger_at(0);
    let address = rand_ed25519_address();
    let nft_id = NftId(rand::random());
    let alias_id = AliasId(rand::random());
    let foundry_alias = rand_alias_address();
    let serial_number = rand::random();

    let nft_output = output(nft(234_348, nft_id, address), 1);
    let alias_output = output(alias(59_854_598, alias_id, address), 1);
    let foundry_output = output(foundry(2_156_548, foundry_alias, serial_number), 1);
    let fresh_alias = output(alias(7, AliasId::null(), address), 1);
    let outputs = vec![
        output(basic(3_242_343, address), 1),
        nft_output.clone(),
        output(nft(1, NftId::null(), rand_ed25519_address()), 1),
        output(nft(2, NftId::null(), rand_ed25519_address()), 1),
        alias_output.clone(),
        fresh_alias.clone(),
        output(foundry(3, rand_alias_address(), 1), 1),
        foundry_output.clone(),
    ];
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs(outputs))
        .unwrap();

    assert_eq!(ledger.load_unspent_outputs(OutputFilter::nft(None)).unwrap().len(), 3);
    assert_eq!(
        ledger.load_unspent_outputs(OutputFilter::nft(Some(nft_id))).unwrap(),
        vec![nft_output]
    );

    assert_eq!(ledger.load_unspent_outputs(OutputFilter::alias(None)).unwrap().len(), 2);
    assert_eq!(
        ledger.load_unspent_outputs(OutputFilter::alias(Some(alias_id))).unwrap(),
        vec![alias_output]
    );
    // A fresh alias is found by the id derived from the output that created it.
    assert_eq!(
        ledger
            .load_unspent_outputs(OutputFilter::alias(Some(AliasId::from_output_id(&fresh_alias.output_id))))
            .unwrap(),
        vec![fresh_alias]
    );

    let foundry_id = FoundryId::build(&foundry_alias, serial_number, TokenScheme::Simple);
    assert_eq!(ledger.load_unspent_outputs(OutputFilter::foundry(None)).unwrap().len(), 2);
    let found = ledger.load_unspent_outputs(OutputFilter::foundry(Some(foundry_id))).unwrap();
    assert_eq!(sorted_ids(&found), vec![foundry_output.output_id]);
    assert_eq!(foundry_id.alias_address(), Some(foundry_alias));
    assert_eq!(foundry_id.serial_number(), serial_number);

    assert!(ledger
        .load_unspent_outputs(OutputFilter::nft(Some(NftId(rand::random()))))
        .unwrap()
        .is_empty());
}

#[test]
fn test_issuer_filter() {
    let ledger = ledger_at(0);
    let issuer = rand_ed25519_address();
    let alias_issuer = rand_ed25519_address();

    let issued_alias = with_features(
        output(alias(59_854_598, AliasId(rand::random()), rand_ed25519_address()), 1),
        Features::default().with_issuer(alias_issuer),
    );
    let issued_nfts = vec![
        with_features(
            output(nft(234_348, NftId(rand::random()), rand_nft_address()), 1),
            Features::default().with_issuer(issuer),
        ),
        with_features(
            output(nft(234_342_348, NftId(rand::random()), rand_alias_address()), 1),
            Features::default().with_issuer(issuer),
        ),
    ];
    let alias_issued_nft = with_features(
        output(nft(234_348, NftId(rand::random()), rand_ed25519_address()), 1),
        Features::default().with_issuer(alias_issuer),
    );
    let mut outputs = vec![
        issued_alias.clone(),
        with_features(
            output(alias(59_854_598, AliasId(rand::random()), rand_ed25519_address()), 1),
            Features::default().with_issuer(rand_ed25519_address()),
        ),
        with_features(
            output(nft(234_348, NftId(rand::random()), rand_alias_address()), 1),
            Features::default().with_issuer(rand_alias_address()),
        ),
        alias_issued_nft.clone(),
    ];
    outputs.extend(issued_nfts.clone());
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs(outputs))
        .unwrap();

    assert_eq!(ledger.load_unspent_outputs(OutputFilter::nft(None)).unwrap().len(), 4);

    let found = ledger.load_unspent_outputs(OutputFilter::all().issuer(issuer)).unwrap();
    assert_eq!(sorted_ids(&found), sorted_ids(&issued_nfts));

    let found = ledger
        .load_unspent_outputs(OutputFilter::all().issuer(alias_issuer))
        .unwrap();
    assert_eq!(sorted_ids(&found), sorted_ids([&issued_alias, &alias_issued_nft]));

    let found = ledger
        .load_unspent_outputs(OutputFilter::all().issuer(alias_issuer).kind(OutputKind::Alias))
        .unwrap();
    assert_eq!(found, vec![issued_alias]);
}

#[test]
fn test_sender_and_tag_filters() {
    let ledger = ledger_at(0);
    let sender = rand_ed25519_address();
    let testing = Tag::new("Testing").unwrap();

    let sent = |o: Output, tag: Option<&str>| {
        let features = Features::default().with_sender(sender);
        let features = match tag {
            Some(tag) => features.with_tag(Tag::new(tag).unwrap()),
            None => features,
        };
        with_features(o, features)
    };
    let from_sender = vec![
        sent(output(basic(59_854_598, rand_ed25519_address()), 1), None),
        sent(output(basic(59_854_598, rand_ed25519_address()), 1), None),
        sent(output(basic(59_854_598, rand_ed25519_address()), 1), Some("TestingOther")),
        sent(output(basic(59_854_598, rand_ed25519_address()), 1), Some("Testing")),
        sent(output(nft(234_342_348, NftId(rand::random()), rand_alias_address()), 1), Some("Testing")),
    ];
    let mut outputs = vec![
        with_features(
            output(basic(59_854_598, rand_ed25519_address()), 1),
            Features::default().with_sender(rand_ed25519_address()),
        ),
        with_features(
            output(basic(59_854_598, rand_ed25519_address()), 1),
            Features::default()
                .with_sender(rand_ed25519_address())
                .with_tag(testing.clone()),
        ),
    ];
    outputs.extend(from_sender.clone());
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs(outputs.clone()))
        .unwrap();

    let mut everything = ledger.load_unspent_outputs(OutputFilter::basic(None)).unwrap();
    everything.extend(ledger.load_unspent_outputs(OutputFilter::nft(None)).unwrap());
    assert_eq!(sorted_ids(&everything), sorted_ids(&outputs));

    let found = ledger.load_unspent_outputs(OutputFilter::all().sender(sender)).unwrap();
    assert_eq!(sorted_ids(&found), sorted_ids(&from_sender));

    let found = ledger
        .load_unspent_outputs(OutputFilter::all().sender(sender).tag(testing.clone()))
        .unwrap();
    assert_eq!(sorted_ids(&found), sorted_ids([&from_sender[3], &from_sender[4]]));

    let found = ledger
        .load_unspent_outputs(OutputFilter::nft(None).sender(sender).tag(testing))
        .unwrap();
    assert_eq!(found, vec![from_sender[4].clone()]);
}

#[test]
fn test_iteration_stops_early() {
    let ledger = ledger_at(0);
    let address = rand_ed25519_address();
    let outputs = (0..10).map(|i| output(basic(i, address), 1)).collect::<Vec<_>>();
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs(outputs))
        .unwrap();

    let mut iter = ledger.unspent_outputs(OutputFilter::basic(Some(address))).unwrap();
    let first = iter.by_ref().take(3).collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(iter.count(), 7);
}

#[test]
fn test_snapshot_iteration_ignores_later_milestones() {
    let ledger = ledger_at(0);
    let first = output(basic(1, rand_ed25519_address()), 1);
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs([first.clone()]))
        .unwrap();

    let iter = ledger.unspent_outputs(OutputFilter::all()).unwrap();
    ledger
        .apply_confirmation(
            &Confirmation::new(2)
                .with_outputs([output(basic(2, rand_ed25519_address()), 2)])
                .with_spents([spend(&first, 2)]),
        )
        .unwrap();

    let seen = iter.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(seen, vec![first]);
}

#[test]
fn test_pages_concatenate_to_full_result() {
    let ledger = ledger_at(0);
    let address = rand_ed25519_address();
    let outputs = (0..23)
        .map(|i| match i % 3 {
            0 => output(basic(i, address), 1),
            1 => output(nft(i, NftId::null(), address), 1),
            _ => output(basic(i, rand_ed25519_address()), 1),
        })
        .collect::<Vec<_>>();
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs(outputs))
        .unwrap();

    for filter in [
        OutputFilter::all(),
        OutputFilter::all().address(address),
        OutputFilter::basic(Some(address)),
    ] {
        let expected = ledger.load_unspent_outputs(filter.clone()).unwrap();
        for page_size in [1, 4, 7, 100] {
            let mut pages = Vec::new();
            let mut cursor: Option<PageCursor> = None;
            loop {
                let page = ledger.load_page(filter.clone(), page_size, cursor).unwrap();
                assert!(page.outputs.len() <= page_size);
                pages.extend(page.outputs);
                match page.cursor {
                    // Cursors survive being handed out as strings.
                    Some(next) => cursor = Some(next.to_string().parse().unwrap()),
                    None => break,
                }
            }
            assert_eq!(pages, expected);
        }

        let unbounded = ledger.load_page(filter.clone(), 0, None).unwrap();
        assert_eq!(unbounded.outputs, expected);
        assert_eq!(unbounded.cursor, None);
    }
}

#[test]
fn test_cursor_of_another_index_is_rejected() {
    let ledger = ledger_at(0);
    let address = rand_ed25519_address();
    ledger
        .apply_confirmation(&Confirmation::new(1).with_outputs((1..=4).map(|i| output(basic(i, address), 1))))
        .unwrap();

    let by_address = OutputFilter::all().address(address);
    let cursor = ledger.load_page(by_address.clone(), 2, None).unwrap().cursor.unwrap();

    let err = ledger
        .load_page(OutputFilter::all().kind(OutputKind::Basic), 2, Some(cursor.clone()))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCursor(_)));
    assert!(!err.is_fatal());
    let err = ledger
        .load_page(OutputFilter::all().address(rand_ed25519_address()), 2, Some(cursor.clone()))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCursor(_)));

    let rest = ledger.load_page(by_address, 2, Some(cursor)).unwrap();
    assert_eq!(rest.outputs.len(), 2);
    assert_eq!(rest.cursor, None);
}
