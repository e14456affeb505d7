use crate::registers::NUM_REGISTERS;

#[rustfmt::skip]
pub const VOODOO_REGISTER_NAMES: [&str; NUM_REGISTERS] = [
    // 0x000
    "status",          "intrCtrl",        "vertexAx",        "vertexAy",
    "vertexBx",        "vertexBy",        "vertexCx",        "vertexCy",
    "startR",          "startG",          "startB",          "startZ",
    "startA",          "startS",          "startT",          "startW",
    // 0x040
    "dRdX",            "dGdX",            "dBdX",            "dZdX",
    "dAdX",            "dSdX",            "dTdX",            "dWdX",
    "dRdY",            "dGdY",            "dBdY",            "dZdY",
    "dAdY",            "dSdY",            "dTdY",            "dWdY",
    // 0x080
    "triangleCMD",     "reserved084",     "fvertexAx",       "fvertexAy",
    "fvertexBx",       "fvertexBy",       "fvertexCx",       "fvertexCy",
    "fstartR",         "fstartG",         "fstartB",         "fstartZ",
    "fstartA",         "fstartS",         "fstartT",         "fstartW",
    // 0x0C0
    "fdRdX",           "fdGdX",           "fdBdX",           "fdZdX",
    "fdAdX",           "fdSdX",           "fdTdX",           "fdWdX",
    "fdRdY",           "fdGdY",           "fdBdY",           "fdZdY",
    "fdAdY",           "fdSdY",           "fdTdY",           "fdWdY",
    // 0x100
    "ftriangleCMD",    "fbzColorPath",    "fogMode",         "alphaMode",
    "fbzMode",         "lfbMode",         "clipLeftRight",   "clipLowYHighY",
    "nopCMD",          "fastfillCMD",     "swapbufferCMD",   "fogColor",
    "zaColor",         "chromaKey",       "chromaRange",     "userIntrCMD",
    // 0x140
    "stipple",         "color0",          "color1",          "fbiPixelsIn",
    "fbiChromaFail",   "fbiZfuncFail",    "fbiAfuncFail",    "fbiPixelsOut",
    "fogTable160",     "fogTable164",     "fogTable168",     "fogTable16c",
    "fogTable170",     "fogTable174",     "fogTable178",     "fogTable17c",
    // 0x180
    "fogTable180",     "fogTable184",     "fogTable188",     "fogTable18c",
    "fogTable190",     "fogTable194",     "fogTable198",     "fogTable19c",
    "fogTable1a0",     "fogTable1a4",     "fogTable1a8",     "fogTable1ac",
    "fogTable1b0",     "fogTable1b4",     "fogTable1b8",     "fogTable1bc",
    // 0x1C0
    "fogTable1c0",     "fogTable1c4",     "fogTable1c8",     "fogTable1cc",
    "fogTable1d0",     "fogTable1d4",     "fogTable1d8",     "fogTable1dc",
    "cmdFifoBaseAddr", "cmdFifoBump",     "cmdFifoRdPtr",    "cmdFifoAMin",
    "cmdFifoAMax",     "cmdFifoDepth",    "cmdFifoHoles",    "reserved1fc",
    // 0x200
    "fbiInit4",        "vRetrace",        "backPorch",       "videoDimensions",
    "fbiInit0",        "fbiInit1",        "fbiInit2",        "fbiInit3",
    "hSync",           "vSync",           "clutData",        "dacData",
    "maxRgbDelta",     "hBorder",         "vBorder",         "borderColor",
    // 0x240
    "hvRetrace",       "fbiInit5",        "fbiInit6",        "fbiInit7",
    "reserved250",     "reserved254",     "fbiSwapHistory",  "fbiTrianglesOut",
    "sSetupMode",      "sVx",             "sVy",             "sARGB",
    "sRed",            "sGreen",          "sBlue",           "sAlpha",
    // 0x280
    "sVz",             "sWb",             "sWtmu0",          "sS/Wtmu0",
    "sT/Wtmu0",        "sWtmu1",          "sS/Wtmu1",        "sT/Wtmu1",
    "sDrawTriCMD",     "sBeginTriCMD",    "reserved2a8",     "reserved2ac",
    "reserved2b0",     "reserved2b4",     "reserved2b8",     "reserved2bc",
    // 0x2C0
    "bltSrcBaseAddr",  "bltDstBaseAddr",  "bltXYStrides",    "bltSrcChromaRange",
    "bltDstChromaRange", "bltClipX",      "bltClipY",        "reserved2dc",
    "bltSrcXY",        "bltDstXY",        "bltSize",         "bltRop",
    "bltColor",        "reserved2f4",     "bltCommand",      "bltData",
    // 0x300
    "textureMode",     "tLOD",            "tDetail",         "texBaseAddr",
    "texBaseAddr_1",   "texBaseAddr_2",   "texBaseAddr_3_8", "trexInit0",
    "trexInit1",       "nccTable0.0",     "nccTable0.1",     "nccTable0.2",
    "nccTable0.3",     "nccTable0.4",     "nccTable0.5",     "nccTable0.6",
    // 0x340
    "nccTable0.7",     "nccTable0.8",     "nccTable0.9",     "nccTable0.A",
    "nccTable0.B",     "nccTable1.0",     "nccTable1.1",     "nccTable1.2",
    "nccTable1.3",     "nccTable1.4",     "nccTable1.5",     "nccTable1.6",
    "nccTable1.7",     "nccTable1.8",     "nccTable1.9",     "nccTable1.A",
    // 0x380
    "nccTable1.B",     "reserved384",     "reserved388",     "reserved38c",
    "reserved390",     "reserved394",     "reserved398",     "reserved39c",
    "reserved3a0",     "reserved3a4",     "reserved3a8",     "reserved3ac",
    "reserved3b0",     "reserved3b4",     "reserved3b8",     "reserved3bc",
    // 0x3C0
    "reserved3c0",     "reserved3c4",     "reserved3c8",     "reserved3cc",
    "reserved3d0",     "reserved3d4",     "reserved3d8",     "reserved3dc",
    "reserved3e0",     "reserved3e4",     "reserved3e8",     "reserved3ec",
    "reserved3f0",     "reserved3f4",     "reserved3f8",     "reserved3fc",
];

#[rustfmt::skip]
pub const BANSHEE_REGISTER_NAMES: [&str; NUM_REGISTERS] = [
    // 0x000
    "status",          "reserved004",     "vertexAx",        "vertexAy",
    "vertexBx",        "vertexBy",        "vertexCx",        "vertexCy",
    "startR",          "startG",          "startB",          "startZ",
    "startA",          "startS",          "startT",          "startW",
    // 0x040
    "dRdX",            "dGdX",            "dBdX",            "dZdX",
    "dAdX",            "dSdX",            "dTdX",            "dWdX",
    "dRdY",            "dGdY",            "dBdY",            "dZdY",
    "dAdY",            "dSdY",            "dTdY",            "dWdY",
    // 0x080
    "triangleCMD",     "reserved084",     "fvertexAx",       "fvertexAy",
    "fvertexBx",       "fvertexBy",       "fvertexCx",       "fvertexCy",
    "fstartR",         "fstartG",         "fstartB",         "fstartZ",
    "fstartA",         "fstartS",         "fstartT",         "fstartW",
    // 0x0C0
    "fdRdX",           "fdGdX",           "fdBdX",           "fdZdX",
    "fdAdX",           "fdSdX",           "fdTdX",           "fdWdX",
    "fdRdY",           "fdGdY",           "fdBdY",           "fdZdY",
    "fdAdY",           "fdSdY",           "fdTdY",           "fdWdY",
    // 0x100
    "ftriangleCMD",    "fbzColorPath",    "fogMode",         "alphaMode",
    "fbzMode",         "lfbMode",         "clipLeftRight",   "clipLowYHighY",
    "nopCMD",          "fastfillCMD",     "swapbufferCMD",   "fogColor",
    "zaColor",         "chromaKey",       "chromaRange",     "userIntrCMD",
    // 0x140
    "stipple",         "color0",          "color1",          "fbiPixelsIn",
    "fbiChromaFail",   "fbiZfuncFail",    "fbiAfuncFail",    "fbiPixelsOut",
    "fogTable160",     "fogTable164",     "fogTable168",     "fogTable16c",
    "fogTable170",     "fogTable174",     "fogTable178",     "fogTable17c",
    // 0x180
    "fogTable180",     "fogTable184",     "fogTable188",     "fogTable18c",
    "fogTable190",     "fogTable194",     "fogTable198",     "fogTable19c",
    "fogTable1a0",     "fogTable1a4",     "fogTable1a8",     "fogTable1ac",
    "fogTable1b0",     "fogTable1b4",     "fogTable1b8",     "fogTable1bc",
    // 0x1C0
    "fogTable1c0",     "fogTable1c4",     "fogTable1c8",     "fogTable1cc",
    "fogTable1d0",     "fogTable1d4",     "fogTable1d8",     "fogTable1dc",
    "reserved1e0",     "reserved1e4",     "reserved1e8",     "colBufferAddr",
    "colBufferStride", "auxBufferAddr",   "auxBufferStride", "reserved1fc",
    // 0x200
    "clipLeftRight1",  "clipTopBottom1",  "reserved208",     "reserved20c",
    "reserved210",     "reserved214",     "reserved218",     "reserved21c",
    "reserved220",     "reserved224",     "reserved228",     "reserved22c",
    "reserved230",     "reserved234",     "reserved238",     "reserved23c",
    // 0x240
    "reserved240",     "reserved244",     "reserved248",     "swapPending",
    "leftOverlayBuf",  "rightOverlayBuf", "fbiSwapHistory",  "fbiTrianglesOut",
    "sSetupMode",      "sVx",             "sVy",             "sARGB",
    "sRed",            "sGreen",          "sBlue",           "sAlpha",
    // 0x280
    "sVz",             "sWb",             "sWtmu0",          "sS/Wtmu0",
    "sT/Wtmu0",        "sWtmu1",          "sS/Wtmu1",        "sT/Wtmu1",
    "sDrawTriCMD",     "sBeginTriCMD",    "reserved2a8",     "reserved2ac",
    "reserved2b0",     "reserved2b4",     "reserved2b8",     "reserved2bc",
    // 0x2C0
    "reserved2c0",     "reserved2c4",     "reserved2c8",     "reserved2cc",
    "reserved2d0",     "reserved2d4",     "reserved2d8",     "reserved2dc",
    "reserved2e0",     "reserved2e4",     "reserved2e8",     "reserved2ec",
    "reserved2f0",     "reserved2f4",     "reserved2f8",     "reserved2fc",
    // 0x300
    "textureMode",     "tLOD",            "tDetail",         "texBaseAddr",
    "texBaseAddr_1",   "texBaseAddr_2",   "texBaseAddr_3_8", "reserved31c",
    "trexInit1",       "nccTable0.0",     "nccTable0.1",     "nccTable0.2",
    "nccTable0.3",     "nccTable0.4",     "nccTable0.5",     "nccTable0.6",
    // 0x340
    "nccTable0.7",     "nccTable0.8",     "nccTable0.9",     "nccTable0.A",
    "nccTable0.B",     "nccTable1.0",     "nccTable1.1",     "nccTable1.2",
    "nccTable1.3",     "nccTable1.4",     "nccTable1.5",     "nccTable1.6",
    "nccTable1.7",     "nccTable1.8",     "nccTable1.9",     "nccTable1.A",
    // 0x380
    "nccTable1.B",     "reserved384",     "reserved388",     "reserved38c",
    "reserved390",     "reserved394",     "reserved398",     "reserved39c",
    "reserved3a0",     "reserved3a4",     "reserved3a8",     "reserved3ac",
    "reserved3b0",     "reserved3b4",     "reserved3b8",     "reserved3bc",
    // 0x3C0
    "reserved3c0",     "reserved3c4",     "reserved3c8",     "reserved3cc",
    "reserved3d0",     "reserved3d4",     "reserved3d8",     "reserved3dc",
    "reserved3e0",     "reserved3e4",     "reserved3e8",     "reserved3ec",
    "reserved3f0",     "reserved3f4",     "reserved3f8",     "reserved3fc",
];
