//! Android key code to Linux input key code table for TV remote devices.
//!
//! Android key codes are defined in `android/keycodes.h` (`AKEYCODE_*`).
//! Linux key codes are defined in `linux/input-event-codes.h` (`KEY_*`,
//! `BTN_*`).
//!
//! # Why Android key codes? (for beginners)
//!
//! Remote-control providers speak in Android's logical key codes: "the user
//! pressed D-pad up" arrives as `AKEYCODE_DPAD_UP` (19).  The kernel knows
//! nothing about those numbers; a physical remote would report `KEY_UP` (103).
//! The host's input stack then maps `KEY_UP` back to `AKEYCODE_DPAD_UP` using
//! its key layout files, so the round trip ends where it started.
//!
//! Every protocol code in this table is also declared as a key capability on
//! every virtual device, so the list doubles as the device's key set.

/// One row of the key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping {
    /// Android `AKEYCODE_*` value.
    pub logical: i32,
    /// Linux `KEY_*` / `BTN_*` value.
    pub protocol: u16,
}

const fn map(logical: i32, protocol: u16) -> KeyMapping {
    KeyMapping { logical, protocol }
}

/// The fixed key table.  Logical codes are unique.
pub static TV_KEYS: &[KeyMapping] = &[
    // Navigation
    map(3, 172),   // HOME → KEY_HOMEPAGE
    map(4, 158),   // BACK → KEY_BACK
    map(19, 103),  // DPAD_UP → KEY_UP
    map(20, 108),  // DPAD_DOWN → KEY_DOWN
    map(21, 105),  // DPAD_LEFT → KEY_LEFT
    map(22, 106),  // DPAD_RIGHT → KEY_RIGHT
    map(23, 353),  // DPAD_CENTER → KEY_SELECT
    map(82, 139),  // MENU → KEY_MENU
    map(84, 217),  // SEARCH → KEY_SEARCH
    map(176, 141), // SETTINGS → KEY_SETUP
    map(187, 580), // APP_SWITCH → KEY_APPSELECT
    map(219, 583), // ASSIST → KEY_ASSISTANT
    // Power and volume
    map(24, 115),  // VOLUME_UP → KEY_VOLUMEUP
    map(25, 114),  // VOLUME_DOWN → KEY_VOLUMEDOWN
    map(26, 116),  // POWER → KEY_POWER
    map(164, 113), // VOLUME_MUTE → KEY_MUTE
    map(223, 142), // SLEEP → KEY_SLEEP
    map(224, 143), // WAKEUP → KEY_WAKEUP
    // Media transport
    map(85, 164),  // MEDIA_PLAY_PAUSE → KEY_PLAYPAUSE
    map(86, 166),  // MEDIA_STOP → KEY_STOPCD
    map(87, 163),  // MEDIA_NEXT → KEY_NEXTSONG
    map(88, 165),  // MEDIA_PREVIOUS → KEY_PREVIOUSSONG
    map(89, 168),  // MEDIA_REWIND → KEY_REWIND
    map(90, 208),  // MEDIA_FAST_FORWARD → KEY_FASTFORWARD
    map(126, 200), // MEDIA_PLAY → KEY_PLAYCD
    map(127, 201), // MEDIA_PAUSE → KEY_PAUSECD
    map(129, 161), // MEDIA_EJECT → KEY_EJECTCD
    map(130, 167), // MEDIA_RECORD → KEY_RECORD
    map(222, 392), // MEDIA_AUDIO_TRACK → KEY_AUDIO
    // TV
    map(165, 358), // INFO → KEY_INFO
    map(166, 402), // CHANNEL_UP → KEY_CHANNELUP
    map(167, 403), // CHANNEL_DOWN → KEY_CHANNELDOWN
    map(168, 418), // ZOOM_IN → KEY_ZOOMIN
    map(169, 419), // ZOOM_OUT → KEY_ZOOMOUT
    map(170, 377), // TV → KEY_TV
    map(172, 365), // GUIDE → KEY_EPG
    map(173, 366), // DVR → KEY_PVR
    map(174, 156), // BOOKMARK → KEY_BOOKMARKS
    map(175, 370), // CAPTIONS → KEY_SUBTITLE
    map(183, 398), // PROG_RED → KEY_RED
    map(184, 399), // PROG_GREEN → KEY_GREEN
    map(185, 400), // PROG_YELLOW → KEY_YELLOW
    map(186, 401), // PROG_BLUE → KEY_BLUE
    map(204, 368), // LANGUAGE_SWITCH → KEY_LANGUAGE
    map(229, 405), // LAST_CHANNEL → KEY_LAST
    // Digits
    map(7, 11),  // 0 → KEY_0
    map(8, 2),   // 1 → KEY_1
    map(9, 3),   // 2 → KEY_2
    map(10, 4),  // 3 → KEY_3
    map(11, 5),  // 4 → KEY_4
    map(12, 6),  // 5 → KEY_5
    map(13, 7),  // 6 → KEY_6
    map(14, 8),  // 7 → KEY_7
    map(15, 9),  // 8 → KEY_8
    map(16, 10), // 9 → KEY_9
    // Letters
    map(29, 30), // A → KEY_A
    map(30, 48), // B → KEY_B
    map(31, 46), // C → KEY_C
    map(32, 32), // D → KEY_D
    map(33, 18), // E → KEY_E
    map(34, 33), // F → KEY_F
    map(35, 34), // G → KEY_G
    map(36, 35), // H → KEY_H
    map(37, 23), // I → KEY_I
    map(38, 36), // J → KEY_J
    map(39, 37), // K → KEY_K
    map(40, 38), // L → KEY_L
    map(41, 50), // M → KEY_M
    map(42, 49), // N → KEY_N
    map(43, 24), // O → KEY_O
    map(44, 25), // P → KEY_P
    map(45, 16), // Q → KEY_Q
    map(46, 19), // R → KEY_R
    map(47, 31), // S → KEY_S
    map(48, 20), // T → KEY_T
    map(49, 22), // U → KEY_U
    map(50, 47), // V → KEY_V
    map(51, 17), // W → KEY_W
    map(52, 45), // X → KEY_X
    map(53, 21), // Y → KEY_Y
    map(54, 44), // Z → KEY_Z
    // Punctuation and editing
    map(55, 51),  // COMMA → KEY_COMMA
    map(56, 52),  // PERIOD → KEY_DOT
    map(61, 15),  // TAB → KEY_TAB
    map(62, 57),  // SPACE → KEY_SPACE
    map(66, 28),  // ENTER → KEY_ENTER
    map(67, 14),  // DEL → KEY_BACKSPACE
    map(68, 41),  // GRAVE → KEY_GRAVE
    map(69, 12),  // MINUS → KEY_MINUS
    map(70, 13),  // EQUALS → KEY_EQUAL
    map(71, 26),  // LEFT_BRACKET → KEY_LEFTBRACE
    map(72, 27),  // RIGHT_BRACKET → KEY_RIGHTBRACE
    map(73, 43),  // BACKSLASH → KEY_BACKSLASH
    map(74, 39),  // SEMICOLON → KEY_SEMICOLON
    map(75, 40),  // APOSTROPHE → KEY_APOSTROPHE
    map(76, 53),  // SLASH → KEY_SLASH
    map(92, 104), // PAGE_UP → KEY_PAGEUP
    map(93, 109), // PAGE_DOWN → KEY_PAGEDOWN
    map(111, 1),  // ESCAPE → KEY_ESC
    map(112, 111), // FORWARD_DEL → KEY_DELETE
    map(122, 102), // MOVE_HOME → KEY_HOME
    map(123, 107), // MOVE_END → KEY_END
    map(124, 110), // INSERT → KEY_INSERT
    // Modifiers
    map(57, 56),  // ALT_LEFT → KEY_LEFTALT
    map(58, 100), // ALT_RIGHT → KEY_RIGHTALT
    map(59, 42),  // SHIFT_LEFT → KEY_LEFTSHIFT
    map(60, 54),  // SHIFT_RIGHT → KEY_RIGHTSHIFT
    map(113, 29), // CTRL_LEFT → KEY_LEFTCTRL
    map(114, 97), // CTRL_RIGHT → KEY_RIGHTCTRL
    map(117, 125), // META_LEFT → KEY_LEFTMETA
    map(118, 126), // META_RIGHT → KEY_RIGHTMETA
    // Function keys
    map(131, 59), // F1 → KEY_F1
    map(132, 60), // F2 → KEY_F2
    map(133, 61), // F3 → KEY_F3
    map(134, 62), // F4 → KEY_F4
    map(135, 63), // F5 → KEY_F5
    map(136, 64), // F6 → KEY_F6
    map(137, 65), // F7 → KEY_F7
    map(138, 66), // F8 → KEY_F8
    map(139, 67), // F9 → KEY_F9
    map(140, 68), // F10 → KEY_F10
    map(141, 87), // F11 → KEY_F11
    map(142, 88), // F12 → KEY_F12
    // Gamepad
    map(96, 0x130),  // BUTTON_A → BTN_SOUTH
    map(97, 0x131),  // BUTTON_B → BTN_EAST
    map(99, 0x133),  // BUTTON_X → BTN_NORTH
    map(100, 0x134), // BUTTON_Y → BTN_WEST
    map(102, 0x136), // BUTTON_L1 → BTN_TL
    map(103, 0x137), // BUTTON_R1 → BTN_TR
    map(106, 0x13d), // BUTTON_THUMBL → BTN_THUMBL
    map(107, 0x13e), // BUTTON_THUMBR → BTN_THUMBR
    map(108, 0x13b), // BUTTON_START → BTN_START
    map(109, 0x13a), // BUTTON_SELECT → BTN_SELECT
    map(110, 0x13c), // BUTTON_MODE → BTN_MODE
];
