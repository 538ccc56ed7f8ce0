//! End-to-end menu flows through both front-ends.

mod common;

use cardmate_core::card::trailer_block;
use cardmate_core::{
    App, Button, Clock, Config, InteractionState, MenuItem, Runtime, VirtualCard, FACTORY_KEY,
    SECONDARY_KEY,
};
use common::{board, press, started, ScriptedButtons, UID};

#[test]
fn start_greets_and_draws_menu() {
    let mut board = board(VirtualCard::classic_1k(UID));
    let mut app = App::default();
    app.start(&mut board);

    assert_eq!(app.state(), InteractionState::MainMenu);
    assert_eq!(board.lcd.grid.row(0).trim_end(), ">Write Default");
    assert_eq!(board.lcd.grid.row(1).trim_end(), " Write Custom");
    assert!(board.serial.output.contains("=== Main Menu ==="));
    assert!(board.serial.output.contains("1. Write Default\r\n"));
    assert!(board.serial.output.contains("5. Change Key\r\n"));
}

#[test]
fn keypad_write_default_end_to_end() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    press(&mut app, &mut board, &[Button::Select]);

    assert_eq!(&board.reader.block(4), b"Hello NFC!      ");
    assert!(board.lcd.saw("Place card..."));
    assert!(board.lcd.saw("Write OK"));
    assert!(board.serial.output.contains("Write Default: OK, wrote \"Hello NFC!\""));
    assert_eq!(app.state(), InteractionState::MainMenu);
    assert_eq!(board.lcd.grid.row(0).trim_end(), ">Write Default");
    assert!(board.clock.now_ms() >= u64::from(app.config().result_hold_ms));
    assert_eq!(board.reader.deselects(), 1);
}

#[test]
fn keypad_menu_wraps_both_ways() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    press(&mut app, &mut board, &[Button::Up]);
    assert_eq!(app.selection().current(), MenuItem::ChangeKey);
    assert_eq!(board.lcd.grid.row(0).trim_end(), ">Change Key");
    assert_eq!(board.lcd.grid.row(1).trim_end(), " Write Default");

    press(&mut app, &mut board, &[Button::Down, Button::Down, Button::Left, Button::Right]);
    assert_eq!(app.selection().current(), MenuItem::WriteCustom);
    assert_eq!(app.state(), InteractionState::MainMenu);
}

#[test]
fn keypad_text_editor_writes_trimmed_value() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    press(&mut app, &mut board, &[Button::Down, Button::Select]);
    assert_eq!(app.state(), InteractionState::TextInput);
    assert!(board.serial.output.contains("Enter custom text"));
    assert_eq!(board.lcd.grid.row(0).trim_end(), "Enter text:");

    press(&mut app, &mut board, &[Button::Up, Button::Up, Button::Right, Button::Up]);
    assert_eq!(app.text_editor().map(|text| text.value()), Some("BA"));
    assert_eq!(board.lcd.grid.row(1).trim_end(), "BA");
    assert_eq!(board.lcd.grid.caret(), Some((1, 1)));

    press(&mut app, &mut board, &[Button::Right, Button::Right, Button::Select]);
    assert_eq!(&board.reader.block(4), b"BA              ");
    assert!(board.serial.output.contains("Write Custom: OK, wrote \"BA\""));
    assert_eq!(app.state(), InteractionState::MainMenu);
    assert!(app.text_editor().is_none());
}

#[test]
fn keypad_key_editor_installs_user_key() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    press(&mut app, &mut board, &[Button::Up, Button::Select]);
    assert_eq!(app.state(), InteractionState::KeyInput);
    assert_eq!(board.lcd.grid.row(0).trim_end(), "New key (hex):");

    press(&mut app, &mut board, &[Button::Up, Button::Up, Button::Up, Button::Up, Button::Up]);
    press(&mut app, &mut board, &[Button::Up, Button::Up, Button::Up, Button::Up, Button::Up]);
    press(&mut app, &mut board, &[Button::Up]);
    for _ in 0..11 {
        press(&mut app, &mut board, &[Button::Select]);
    }
    assert_eq!(app.state(), InteractionState::KeyInput);
    assert_eq!(app.key_editor().map(|key| key.cursor()), Some(11));

    press(&mut app, &mut board, &[Button::Select]);
    assert_eq!(app.state(), InteractionState::MainMenu);
    assert_eq!(app.keys().user_key(), &[0xBB; 6]);
    assert!(board.lcd.saw("Key changed"));
    assert!(board.serial.output.contains("Change Key: OK, user key is now BBBBBBBBBBBB"));
}

#[test]
fn serial_custom_text_is_written_and_echoed() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "4");
    assert_eq!(app.state(), InteractionState::SerialTextInput);
    assert_eq!(board.lcd.grid.row(0).trim_end(), "Serial input...");

    app.handle_line(&mut board, "Serial says hi");
    assert_eq!(&board.reader.block(4), b"Serial says hi  ");
    assert!(board.serial.output.contains("Write Custom: OK, wrote \"Serial says hi\""));
    assert_eq!(app.state(), InteractionState::MainMenu);
    assert_eq!(board.clock.now_ms(), 0);
}

#[test]
fn serial_custom_text_is_truncated_to_block() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "4");
    app.handle_line(&mut board, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    assert_eq!(&board.reader.block(4), b"ABCDEFGHIJKLMNOP");
    assert!(board.serial.output.contains("wrote \"ABCDEFGHIJKLMNOP\""));
}

#[test]
fn serial_read_reports_uid_data_and_hex() {
    let mut card = VirtualCard::classic_1k(UID);
    card.set_block(4, *b"Hello NFC!      ");
    let (mut app, mut board) = started(card);

    app.handle_line(&mut board, "2");
    let output = board.serial.take_output();
    assert!(output.contains("UID: 01020304\r\n"));
    assert!(output.contains("Data: Hello NFC!      \r\n"));
    assert!(output.contains("Hex: 48 65 6C 6C 6F 20 4E 46 43 21 20 20 20 20 20 20\r\n"));
    assert!(board.lcd.saw("UID:01020304"));
    assert!(board.lcd.saw("Data:Hello NFC! "));
}

#[test]
fn serial_format_reports_sector_count() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "3");
    assert!(board.serial.output.contains("Format Card: OK, 15 sectors wiped"));
    assert!(board.lcd.saw("15 sectors wiped"));
}

#[test]
fn serial_invalid_key_is_rejected() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "5");
    assert_eq!(app.state(), InteractionState::SerialKeyInput);
    app.handle_line(&mut board, "ZZZZZZZZZZZZ");

    assert!(board.lcd.saw("Invalid key"));
    assert!(board
        .serial
        .output
        .contains("Change Key failed: key must be exactly 12 hexadecimal characters"));
    assert_eq!(app.keys().user_key(), &FACTORY_KEY);
    assert_eq!(app.state(), InteractionState::MainMenu);
}

#[test]
fn serial_key_change_enables_custom_keyed_card() {
    let custom = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID).with_key(custom));

    app.handle_line(&mut board, "2");
    assert!(board.serial.output.contains("Read Card failed: authentication failed for block 7"));

    board.reader.reset_counters();
    app.handle_line(&mut board, "5");
    app.handle_line(&mut board, "a0a1a2a3a4a5");
    assert_eq!(app.keys().user_key(), &custom);

    board.serial.output.clear();
    app.handle_line(&mut board, "2");
    assert!(board.serial.output.contains("UID: 01020304"));
    assert_eq!(board.reader.auth_attempts(), 3);
}

#[test]
fn serial_invalid_choice_and_help() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "9");
    assert!(board.serial.output.contains("Invalid option: 9"));
    assert_eq!(app.state(), InteractionState::MainMenu);

    board.serial.output.clear();
    app.handle_line(&mut board, "help");
    assert!(board.serial.output.contains("=== Main Menu ==="));
}

#[test]
fn secondary_keyed_card_reads_on_fallback() {
    let mut card = VirtualCard::classic_1k(UID).with_key(SECONDARY_KEY);
    card.set_block(4, *b"fallback works  ");
    let (mut app, mut board) = started(card);

    app.handle_line(&mut board, "2");
    assert!(board.serial.output.contains("Data: fallback works  "));
    assert_eq!(board.reader.auth_attempts(), 2);
}

#[test]
fn missing_card_reports_timeout() {
    let mut card = VirtualCard::classic_1k(UID);
    card.set_present(false);
    let (mut app, mut board) = started(card);

    press(&mut app, &mut board, &[Button::Select]);

    let config = Config::default();
    assert!(board.lcd.saw("No card found"));
    assert!(board.serial.output.contains("Write Default failed: no card detected before timeout"));
    assert!(board.clock.now_ms() >= u64::from(config.card_timeout_ms + config.result_hold_ms));
    assert_eq!(app.state(), InteractionState::MainMenu);
}

#[test]
fn incompatible_card_is_refused() {
    let card = VirtualCard::blank(UID, cardmate_core::CardType::Unsupported(0x00));
    let mut board = board(card);
    let mut app = App::new(Config::default().with_card_timeout_ms(300));
    app.start(&mut board);

    app.handle_line(&mut board, "1");
    assert!(board.serial.output.contains("Write Default failed: card is not a MIFARE Classic"));
    assert_eq!(board.reader.auth_attempts(), 0);
}

#[test]
fn format_stops_at_locked_sector() {
    let locked = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID).with_sector_key(5, locked));

    app.handle_line(&mut board, "3");
    let expected = format!("Format Card failed: authentication failed for block {}", trailer_block(5));
    assert!(board.serial.output.contains(&expected));
    assert!(board.lcd.saw("Auth failed"));
}

#[test]
fn serial_line_finishes_keypad_text_edit() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    press(&mut app, &mut board, &[Button::Down, Button::Select, Button::Up]);
    assert_eq!(app.state(), InteractionState::TextInput);

    app.handle_line(&mut board, "from console");
    assert_eq!(&board.reader.block(4), b"from console    ");
    assert!(app.text_editor().is_none());
    assert_eq!(app.state(), InteractionState::MainMenu);
}

#[test]
fn keypad_select_cancels_serial_prompt() {
    let (mut app, mut board) = started(VirtualCard::classic_1k(UID));

    app.handle_line(&mut board, "4");
    press(&mut app, &mut board, &[Button::Up, Button::Down]);
    assert_eq!(app.state(), InteractionState::SerialTextInput);

    press(&mut app, &mut board, &[Button::Select]);
    assert_eq!(app.state(), InteractionState::MainMenu);
    assert_eq!(board.reader.block(4), [0u8; 16]);
}

#[test]
fn runtime_debounces_held_button() {
    let buttons = ScriptedButtons {
        held: Some(Button::Down),
        ..ScriptedButtons::default()
    };
    let mut runtime = Runtime::new(Config::default(), board(VirtualCard::classic_1k(UID)), buttons);
    runtime.start();

    for _ in 0..50 {
        runtime.tick();
    }

    // accepted at 0, 200 and 400 ms
    assert_eq!(runtime.app().selection().index(), 3);
    assert_eq!(runtime.board().clock.now_ms(), 500);
}

#[test]
fn runtime_handles_backspace_and_lines() {
    let mut runtime = Runtime::new(
        Config::default(),
        board(VirtualCard::classic_1k(UID)),
        ScriptedButtons::default(),
    );
    runtime.start();

    runtime.board_mut().serial.send_bytes(b"5\x084\r\n");
    runtime.poll();
    assert_eq!(runtime.app().state(), InteractionState::SerialTextInput);
    assert!(runtime.board().serial.output.contains("\x08 \x08"));

    runtime.board_mut().serial.send("hi there\x7f\x7f\x7f\x7f\x7f\x7f\x7fey\n");
    runtime.poll();
    assert_eq!(&runtime.board().reader.block(4), b"hey             ");
    assert_eq!(runtime.app().state(), InteractionState::MainMenu);
}

#[test]
fn runtime_routes_sampled_button() {
    let mut buttons = ScriptedButtons::default();
    buttons.queue.push_back(Some(Button::Select));
    let mut runtime = Runtime::new(Config::default(), board(VirtualCard::classic_1k(UID)), buttons);
    runtime.start();

    runtime.tick();
    assert_eq!(&runtime.board().reader.block(4), b"Hello NFC!      ");
    assert_eq!(runtime.board().reader.deselects(), 1);
}

#[test]
fn runtime_echoes_typed_console_input() {
    let mut runtime = Runtime::new(
        Config::default(),
        board(VirtualCard::classic_1k(UID)),
        ScriptedButtons::default(),
    );
    runtime.start();
    runtime.board_mut().serial.output.clear();

    runtime.board_mut().serial.send("9x\x08");
    runtime.poll();
    assert_eq!(runtime.board().serial.output, "9x\x08 \x08");

    runtime.board_mut().serial.send("\r");
    runtime.poll();
    assert!(runtime.board().serial.output.starts_with("9x\x08 \x08\r\nInvalid option: 9\r\n"));
}
